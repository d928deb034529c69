//! Radio-to-IR SFR ratio against IR SFR (`SFR_relative_plot.png`).
//!
//! The catalog's IR SFR errors are not used here: the IR uncertainty is taken
//! as a flat 20%, and the ratio error is propagated from it and the radio error:
//!
//! ```text
//! σ_ratio = sqrt((σ_radio / IR)² + (radio / IR² · σ_IR)²)
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;

use crate::catalog::{Catalog, Partition};
use crate::domain::{GalaxyRow, PlotConfig, SourceClass};
use crate::error::{AppError, EXIT_COMPUTE};
use crate::plot::series::{self, ErrorPoint, FLAGGED_COLOR, LIMIT_COLOR, Marker, NORMAL_COLOR};

pub const FILE_NAME: &str = "SFR_relative_plot.png";

/// Fractional IR SFR uncertainty assumed for the ratio.
pub const IR_FRACTIONAL_ERROR: f64 = 0.2;
/// Ratios inside this band agree within a factor of two.
pub const TOLERANCE_BAND: (f64, f64) = (0.5, 2.0);

const SIZE: (u32, u32) = (1500, 1200);

pub fn render_relative_sfr(catalog: &Catalog, partition: &Partition, config: &PlotConfig) -> Result<PathBuf, AppError> {
    let path = config.out_dir.join(FILE_NAME);
    draw(&path, catalog, partition, config)
        .map_err(|e| AppError::new(EXIT_COMPUTE, format!("Failed to render '{}': {e}", path.display())))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// `(IR, radio/IR, σ_IR, σ_ratio)` for one row.
pub fn ratio_point(row: &GalaxyRow) -> (f64, f64, f64, f64) {
    let ir = row.ir_sfr;
    let ratio = row.radio_sfr / ir;
    let ir_err = IR_FRACTIONAL_ERROR * ir;
    let ratio_err = ((row.radio_sfr_err / ir).powi(2) + (row.radio_sfr / (ir * ir) * ir_err).powi(2)).sqrt();
    (ir, ratio, ir_err, ratio_err)
}

fn draw(path: &Path, catalog: &Catalog, partition: &Partition, config: &PlotConfig) -> Result<(), Box<dyn Error>> {
    let normal = series::collect_points(catalog, partition, SourceClass::Normal, ratio_point);
    let flagged = series::collect_points(catalog, partition, SourceClass::Flagged, ratio_point);
    let limits = series::collect_points(catalog, partition, SourceClass::NonDetected, ratio_point);
    let all = || normal.iter().chain(&flagged).chain(&limits);

    let x_range = series::log_range(all().flat_map(|p| [p.x - p.x_err, p.x + p.x_err]), (1.0, 1000.0));
    let y_range = series::log_range(
        all()
            .flat_map(|p| [p.y, p.y + p.y_err])
            .chain([TOLERANCE_BAND.0, TOLERANCE_BAND.1]),
        (0.1, 10.0),
    );
    let floor = (x_range.0, y_range.0);

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Relative Star Formation Comparison (All Sources)", ("sans-serif", 36))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((x_range.0..x_range.1).log_scale(), (y_range.0..y_range.1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("IR SFR (M☉/yr)")
        .y_desc("21cm SFR / IR SFR")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .draw()?;

    let band = GREEN.mix(0.1).filled();
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x_range.0, TOLERANCE_BAND.0), (x_range.1, TOLERANCE_BAND.1)],
            band,
        )))?
        .label("Factor of 2 Tolerance")
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 20, y + 6)], band));

    series::draw_error_bars(&mut chart, &normal, floor, NORMAL_COLOR)?;
    series::draw_markers(&mut chart, &normal, floor, NORMAL_COLOR, Marker::Dot, SourceClass::Normal.display_name())?;

    series::draw_error_bars(&mut chart, &flagged, floor, FLAGGED_COLOR)?;
    series::draw_markers(
        &mut chart,
        &flagged,
        floor,
        FLAGGED_COLOR,
        Marker::Cross,
        SourceClass::Flagged.display_name(),
    )?;

    let limit_bars: Vec<ErrorPoint> = limits.iter().map(|p| ErrorPoint { y_err: 0.0, ..p.clone() }).collect();
    series::draw_error_bars(&mut chart, &limit_bars, floor, LIMIT_COLOR)?;
    series::draw_upper_limits(&mut chart, &limits, floor, LIMIT_COLOR)?;
    series::draw_markers(
        &mut chart,
        &limits,
        floor,
        LIMIT_COLOR,
        Marker::Dot,
        SourceClass::NonDetected.display_name(),
    )?;

    if config.label_points {
        for points in [&normal, &flagged, &limits] {
            series::draw_labels(&mut chart, points.as_slice(), floor)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_error_propagates_both_terms() {
        let row = GalaxyRow {
            name: "J1".to_string(),
            detected: true,
            redshift: 0.1,
            luminosity: 1e22,
            luminosity_err: 1e21,
            ir_sfr: 100.0,
            ir_sfr_err: 999.0,
            radio_sfr: 50.0,
            radio_sfr_err: 5.0,
        };
        let (x, ratio, x_err, ratio_err) = ratio_point(&row);
        assert_eq!(x, 100.0);
        assert!((ratio - 0.5).abs() < 1e-12);
        assert!((x_err - 20.0).abs() < 1e-12, "catalog IR error is ignored");
        // sqrt(0.05² + 0.1²)
        assert!((ratio_err - 0.0125f64.sqrt()).abs() < 1e-12);
    }
}
