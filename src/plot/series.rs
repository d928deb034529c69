//! Chart building blocks shared by the PNG renderers.
//!
//! Points carry symmetric errors. Anything that lands on a log axis is clamped
//! to that axis' lower bound first, so a lower error bar reaching below zero
//! (or a stem ending at a non-positive value) is drawn to the axis floor
//! instead of producing an unmappable coordinate.

use std::error::Error;

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::catalog::{Catalog, Partition};
use crate::domain::{GalaxyRow, LinearModel, SourceClass};

pub const NORMAL_COLOR: RGBColor = BLUE;
pub const FLAGGED_COLOR: RGBColor = RED;
pub const LIMIT_COLOR: RGBColor = RGBColor(218, 165, 32);
pub const DETECTION_LIMIT_COLOR: RGBColor = RGBColor(255, 140, 0);

/// Upper-limit stems extend from `v` down to `v - v/5`.
pub const LIMIT_STEM_FRACTION: f64 = 0.2;

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// One plotted source.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub y: f64,
    pub x_err: f64,
    pub y_err: f64,
    pub label: String,
}

/// Marker shape for a class of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Dot,
    Cross,
}

/// Map the rows of one class to points; rows with non-finite coordinates are skipped.
pub fn collect_points(
    catalog: &Catalog,
    partition: &Partition,
    class: SourceClass,
    f: impl Fn(&GalaxyRow) -> (f64, f64, f64, f64),
) -> Vec<ErrorPoint> {
    partition
        .rows(catalog, class)
        .filter_map(|row| {
            let (x, y, x_err, y_err) = f(row);
            if !(x.is_finite() && y.is_finite()) {
                debug!("skipping '{}' in {:?} chart series: non-finite coordinate", row.name, class);
                return None;
            }
            Some(ErrorPoint {
                x,
                y,
                x_err: if x_err.is_finite() { x_err.abs() } else { 0.0 },
                y_err: if y_err.is_finite() { y_err.abs() } else { 0.0 },
                label: row.short_name().to_string(),
            })
        })
        .collect()
}

/// `v`, or `floor` when `v` is below it (or not a number).
pub fn clamp_floor(v: f64, floor: f64) -> f64 {
    if v > floor { v } else { floor }
}

/// Range covering the positive values, widened by a factor of two each side.
///
/// Falls back to `fallback` when no value is positive and finite.
pub fn log_range(values: impl IntoIterator<Item = f64>, fallback: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() {
        (lo / 2.0, hi * 2.0)
    } else {
        fallback
    }
}

/// Range covering the values with 5% padding; a single value gets a unit span.
pub fn linear_range(values: impl IntoIterator<Item = f64>, fallback: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return fallback;
    }
    let pad = ((hi - lo) * 0.05).max(if hi > lo { 0.0 } else { 0.5 });
    (lo - pad, hi + pad)
}

/// Sample `model` across `x_range`, keeping only points inside `y_range`.
///
/// With `log_x` the samples are spaced evenly in `ln x`.
pub fn clip_line(
    model: &LinearModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    log_x: bool,
    n: usize,
) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = if log_x {
                (x_range.0.ln() + u * (x_range.1.ln() - x_range.0.ln())).exp()
            } else {
                x_range.0 + u * (x_range.1 - x_range.0)
            };
            (x, model.predict(x))
        })
        .filter(|&(_, y)| y >= y_range.0 && y <= y_range.1)
        .collect()
}

/// Vertical and horizontal error bars. Zero-width errors are not drawn.
pub fn draw_error_bars<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    points: &[ErrorPoint],
    floor: (f64, f64),
    color: RGBColor,
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let style = color.mix(0.6).stroke_width(1);

    chart.draw_series(points.iter().filter(|p| p.y_err > 0.0).map(|p| {
        let x = clamp_floor(p.x, floor.0);
        ErrorBar::new_vertical(
            x,
            clamp_floor(p.y - p.y_err, floor.1),
            clamp_floor(p.y, floor.1),
            clamp_floor(p.y + p.y_err, floor.1),
            style,
            6,
        )
    }))?;

    chart.draw_series(points.iter().filter(|p| p.x_err > 0.0).map(|p| {
        let y = clamp_floor(p.y, floor.1);
        ErrorBar::new_horizontal(
            y,
            clamp_floor(p.x - p.x_err, floor.0),
            clamp_floor(p.x, floor.0),
            clamp_floor(p.x + p.x_err, floor.0),
            style,
            6,
        )
    }))?;
    Ok(())
}

/// Point markers, registered in the legend under `legend`.
pub fn draw_markers<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    points: &[ErrorPoint],
    floor: (f64, f64),
    color: RGBColor,
    marker: Marker,
    legend: &str,
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let coords = points
        .iter()
        .map(move |p| (clamp_floor(p.x, floor.0), clamp_floor(p.y, floor.1)));

    match marker {
        Marker::Dot => {
            chart
                .draw_series(coords.map(|c| Circle::new(c, 4, color.filled())))?
                .label(legend)
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
        Marker::Cross => {
            chart
                .draw_series(coords.map(|c| Cross::new(c, 5, color.stroke_width(2))))?
                .label(legend)
                .legend(move |(x, y)| Cross::new((x, y), 5, color.stroke_width(2)));
        }
    }
    Ok(())
}

/// Upper limits: a stem from each point down by `LIMIT_STEM_FRACTION` of its
/// value, ending in a downward arrowhead.
pub fn draw_upper_limits<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    points: &[ErrorPoint],
    floor: (f64, f64),
    color: RGBColor,
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let style = color.stroke_width(2);
    let stem_end = |p: &ErrorPoint| {
        (
            clamp_floor(p.x, floor.0),
            clamp_floor(p.y - p.y * LIMIT_STEM_FRACTION, floor.1),
        )
    };

    chart.draw_series(points.iter().map(|p| {
        PathElement::new(
            vec![(clamp_floor(p.x, floor.0), clamp_floor(p.y, floor.1)), stem_end(p)],
            style,
        )
    }))?;
    chart.draw_series(
        points
            .iter()
            .map(|p| EmptyElement::at(stem_end(p)) + PathElement::new(vec![(-5, -7), (0, 0), (5, -7)], style)),
    )?;
    Ok(())
}

/// Galaxy names next to each point.
pub fn draw_labels<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    points: &[ErrorPoint],
    floor: (f64, f64),
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    chart.draw_series(points.iter().map(|p| {
        EmptyElement::at((clamp_floor(p.x, floor.0), clamp_floor(p.y, floor.1)))
            + Text::new(p.label.clone(), (6, -16), ("sans-serif", 13).into_font())
    }))?;
    Ok(())
}

/// A straight line clipped to the plotting window, with a legend entry.
#[allow(clippy::too_many_arguments)]
pub fn draw_model_line<X, Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<X, Y>>,
    model: &LinearModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    log_x: bool,
    style: ShapeStyle,
    legend: &str,
) -> Result<(), Box<dyn Error>>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let pts = clip_line(model, x_range, y_range, log_x, 200);
    if pts.len() < 2 {
        debug!("line '{legend}' ({model}) falls outside the plotting window");
        return Ok(());
    }
    chart
        .draw_series(LineSeries::new(pts, style))?
        .label(legend)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DetectionRule;

    #[test]
    fn floor_clamps_non_positive_values() {
        assert_eq!(clamp_floor(-3.0, 10.0), 10.0);
        assert_eq!(clamp_floor(f64::NAN, 10.0), 10.0);
        assert_eq!(clamp_floor(25.0, 10.0), 25.0);
        assert_eq!(clamp_floor(-3.0, f64::NEG_INFINITY), -3.0);
    }

    #[test]
    fn log_range_pads_by_factor_two_and_ignores_non_positive() {
        assert_eq!(log_range([5.0, -1.0, 0.0, 40.0], (1.0, 10.0)), (2.5, 80.0));
        assert_eq!(log_range([0.0, f64::NAN], (1.0, 10.0)), (1.0, 10.0));
    }

    #[test]
    fn linear_range_handles_single_value() {
        assert_eq!(linear_range([0.2], (0.0, 1.0)), (-0.3, 0.7));
        let (lo, hi) = linear_range([0.0, 1.0], (0.0, 1.0));
        assert!((lo + 0.05).abs() < 1e-12 && (hi - 1.05).abs() < 1e-12);
    }

    #[test]
    fn clip_line_stays_inside_window() {
        let pts = clip_line(&LinearModel::one_to_one(), (10.0, 1000.0), (10.0, 600.0), true, 50);
        assert!(pts.len() >= 2);
        assert!((pts[0].0 - 10.0).abs() < 1e-9);
        assert!(pts.iter().all(|&(x, y)| y <= 600.0 && (x - y).abs() < 1e-9));
    }

    #[test]
    fn collect_points_skips_non_finite_rows() {
        let row = |name: &str, ir: f64| GalaxyRow {
            name: name.to_string(),
            detected: true,
            redshift: 0.1,
            luminosity: 1e22,
            luminosity_err: 1e21,
            ir_sfr: ir,
            ir_sfr_err: 1.0,
            radio_sfr: 20.0,
            radio_sfr_err: 2.0,
        };
        let catalog = Catalog::new(vec![row("J1.x", 50.0), row("J2", f64::NAN)], DetectionRule::Combined);
        let partition = crate::catalog::partition(&catalog, 1000.0);
        let pts = collect_points(&catalog, &partition, SourceClass::Normal, |r| {
            (r.ir_sfr, r.radio_sfr, r.ir_sfr_err, r.radio_sfr_err)
        });
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].label, "J1");
    }
}
