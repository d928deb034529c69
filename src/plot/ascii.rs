//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid, linear axes), optimized for:
//! - quick visual sanity checks of a fit in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - normal detections: `o`
//! - fitted lines: one character per line (e.g. `-` free, `.` zero intercept)

use crate::domain::LinearModel;
use crate::report::SourceResidual;

/// Render normal detections with any number of overlaid lines.
///
/// Lines are drawn first, in order, so points and earlier lines win overlaps.
pub fn render_ascii_plot(
    residuals: &[SourceResidual],
    lines: &[(LinearModel, char)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(residuals).unwrap_or((0.0, 1.0));
    let curves: Vec<(Vec<(f64, f64)>, char)> = lines
        .iter()
        .map(|(model, ch)| (model.sample(x_min, x_max, width.max(2)), *ch))
        .collect();

    let (y_min, y_max) = y_range(residuals, &curves).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (curve, ch) in &curves {
        draw_curve(&mut grid, curve, *ch, (x_min, x_max), (y_min, y_max));
    }

    for r in residuals {
        let x = map_x(r.ir_sfr, x_min, x_max, width);
        let y = map_y(r.radio_sfr, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: IR SFR=[{x_min:.2}, {x_max:.2}] | radio SFR=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(residuals: &[SourceResidual]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for r in residuals {
        min_x = min_x.min(r.ir_sfr);
        max_x = max_x.max(r.ir_sfr);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(residuals: &[SourceResidual], curves: &[(Vec<(f64, f64)>, char)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in residuals {
        min_y = min_y.min(r.radio_sfr);
        max_y = max_y.max(r.radio_sfr);
    }
    for (curve, _) in curves {
        for &(_, y) in curve {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, xr: (f64, f64), yr: (f64, f64)) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let px = map_x(x, xr.0, xr.1, width);
        let py = map_y(y, yr.0, yr.1, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, px, py, ch);
        } else if grid[py][px] == ' ' {
            grid[py][px] = ch;
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(name: &str, x: f64, y: f64) -> SourceResidual {
        SourceResidual {
            name: name.to_string(),
            ir_sfr: x,
            radio_sfr: y,
            radio_fit: 100.0,
            residual: y - 100.0,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let points = vec![residual("G1", 1.0, 100.0), residual("G2", 10.0, 110.0)];
        let flat = LinearModel {
            intercept: 100.0,
            slope: 0.0,
        };

        let txt = render_ascii_plot(&points, &[(flat, '-')], 10, 5);
        let expected = concat!(
            "Plot: IR SFR=[1.00, 10.00] | radio SFR=[99.50, 110.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_input_still_renders_grid() {
        let txt = render_ascii_plot(&[], &[], 12, 6);
        assert_eq!(txt.lines().count(), 7);
    }
}
