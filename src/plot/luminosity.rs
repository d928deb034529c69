//! 1.5 GHz luminosity versus redshift (`lum_vs_z.png`).

use std::error::Error;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;

use crate::catalog::{Catalog, Partition};
use crate::domain::{GalaxyRow, PlotConfig, SourceClass};
use crate::error::{AppError, EXIT_COMPUTE};
use crate::plot::series::{self, FLAGGED_COLOR, LIMIT_COLOR, Marker, NORMAL_COLOR};

pub const FILE_NAME: &str = "lum_vs_z.png";

const SIZE: (u32, u32) = (1400, 1000);

pub fn render_luminosity_redshift(
    catalog: &Catalog,
    partition: &Partition,
    config: &PlotConfig,
) -> Result<PathBuf, AppError> {
    let path = config.out_dir.join(FILE_NAME);
    draw(&path, catalog, partition, config)
        .map_err(|e| AppError::new(EXIT_COMPUTE, format!("Failed to render '{}': {e}", path.display())))?;
    info!("wrote {}", path.display());
    Ok(path)
}

fn lum_point(row: &GalaxyRow) -> (f64, f64, f64, f64) {
    (row.redshift, row.luminosity, 0.0, row.luminosity_err)
}

fn draw(path: &Path, catalog: &Catalog, partition: &Partition, config: &PlotConfig) -> Result<(), Box<dyn Error>> {
    let normal = series::collect_points(catalog, partition, SourceClass::Normal, lum_point);
    let flagged = series::collect_points(catalog, partition, SourceClass::Flagged, lum_point);
    let limits = series::collect_points(catalog, partition, SourceClass::NonDetected, lum_point);
    let all = || normal.iter().chain(&flagged).chain(&limits);

    let x_range = series::linear_range(all().map(|p| p.x), (0.0, 1.0));
    let y_range = series::log_range(
        all().flat_map(|p| [p.y, p.y + p.y_err, p.y - p.y * series::LIMIT_STEM_FRACTION]),
        (1e20, 1e24),
    );
    let floor = (f64::NEG_INFINITY, y_range.0);

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Luminosity vs Redshift", ("sans-serif", 36))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range.0..x_range.1, (y_range.0..y_range.1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Redshift (z)")
        .y_desc("1.5 GHz Luminosity (erg/s/Hz)")
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .draw()?;

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
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()?;

    root.present()?;
    Ok(())
}
