//! IR SFR versus radio SFR on log-log axes (`SFR_all_plot.png`).
//!
//! Layout: flagged (AGN) sources get their own panel above the main chart,
//! sharing the x axis, because their radio SFRs sit orders of magnitude above
//! everything else. The panel is omitted when there are no flagged sources.

use std::error::Error;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;

use crate::catalog::{Catalog, Partition};
use crate::domain::{LinearModel, PlotConfig, SfrFit, SourceClass};
use crate::error::{AppError, EXIT_COMPUTE};
use crate::plot::series::{
    self, Canvas, DETECTION_LIMIT_COLOR, ErrorPoint, FLAGGED_COLOR, LIMIT_COLOR, Marker, NORMAL_COLOR,
};

pub const FILE_NAME: &str = "SFR_all_plot.png";

const X_RANGE: (f64, f64) = (10.0, 1000.0);
const Y_RANGE: (f64, f64) = (10.0, 600.0);
/// Proposed detection limit (M☉/yr) on both axes.
const DETECTION_LIMIT: f64 = 30.0;
const SUPPRESSION_FACTOR: f64 = 2.5;
const SIZE: (u32, u32) = (1400, 1600);

/// Render the SFR comparison chart. Fitted lines are drawn when
/// `config.draw_fits` is set and a fit is supplied.
pub fn render_sfr_comparison(
    catalog: &Catalog,
    partition: &Partition,
    fit: Option<&SfrFit>,
    config: &PlotConfig,
) -> Result<PathBuf, AppError> {
    let path = config.out_dir.join(FILE_NAME);
    draw(&path, catalog, partition, fit, config)
        .map_err(|e| AppError::new(EXIT_COMPUTE, format!("Failed to render '{}': {e}", path.display())))?;
    info!("wrote {}", path.display());
    Ok(path)
}

fn sfr_point(row: &crate::domain::GalaxyRow) -> (f64, f64, f64, f64) {
    (row.ir_sfr, row.radio_sfr, row.ir_sfr_err, row.radio_sfr_err)
}

fn draw(
    path: &Path,
    catalog: &Catalog,
    partition: &Partition,
    fit: Option<&SfrFit>,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>> {
    let normal = series::collect_points(catalog, partition, SourceClass::Normal, sfr_point);
    let flagged = series::collect_points(catalog, partition, SourceClass::Flagged, sfr_point);
    let limits = series::collect_points(catalog, partition, SourceClass::NonDetected, sfr_point);

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Star Formation Rate Comparison", ("sans-serif", 36))?;

    let main = if flagged.is_empty() {
        root
    } else {
        let (upper, lower) = root.split_vertically(root.dim_in_pixel().1 as i32 / 5);
        draw_flagged_panel(&upper, &flagged, config)?;
        lower
    };

    draw_main_panel(&main, &normal, &limits, fit, config)?;
    main.present()?;
    Ok(())
}

fn draw_flagged_panel(area: &Canvas<'_>, flagged: &[ErrorPoint], config: &PlotConfig) -> Result<(), Box<dyn Error>> {
    let y_range = series::log_range(
        flagged.iter().flat_map(|p| [p.y - p.y_err, p.y + p.y_err, p.y]),
        (1_000.0, 100_000.0),
    );
    let floor = (X_RANGE.0, y_range.0);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(80)
        .build_cartesian_2d((X_RANGE.0..X_RANGE.1).log_scale(), (y_range.0..y_range.1).log_scale())?;

    chart
        .configure_mesh()
        .label_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(DETECTION_LIMIT, y_range.0), (DETECTION_LIMIT, y_range.1)],
        DETECTION_LIMIT_COLOR.stroke_width(2),
    )))?;

    series::draw_error_bars(&mut chart, flagged, floor, FLAGGED_COLOR)?;
    series::draw_markers(
        &mut chart,
        flagged,
        floor,
        FLAGGED_COLOR,
        Marker::Cross,
        SourceClass::Flagged.display_name(),
    )?;
    if config.label_points {
        series::draw_labels(&mut chart, flagged, floor)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()?;
    Ok(())
}

fn draw_main_panel(
    area: &Canvas<'_>,
    normal: &[ErrorPoint],
    limits: &[ErrorPoint],
    fit: Option<&SfrFit>,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>> {
    let floor = (X_RANGE.0, Y_RANGE.0);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((X_RANGE.0..X_RANGE.1).log_scale(), (Y_RANGE.0..Y_RANGE.1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("IR SFR (M☉/yr)")
        .y_desc("1.5 GHz SFR (M☉/yr)")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .draw()?;

    series::draw_model_line(
        &mut chart,
        &LinearModel::one_to_one(),
        X_RANGE,
        Y_RANGE,
        true,
        BLACK.stroke_width(2),
        "One to One",
    )?;
    series::draw_model_line(
        &mut chart,
        &LinearModel::suppressed_by(SUPPRESSION_FACTOR),
        X_RANGE,
        Y_RANGE,
        true,
        CYAN.stroke_width(2),
        "Factor of 2.5 suppressed",
    )?;

    let limit_style = DETECTION_LIMIT_COLOR.stroke_width(2);
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(DETECTION_LIMIT, Y_RANGE.1), (DETECTION_LIMIT, DETECTION_LIMIT), (X_RANGE.1, DETECTION_LIMIT)],
            limit_style,
        )))?
        .label("Proposed detection limit")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], limit_style));

    if config.draw_fits {
        if let Some(fit) = fit {
            series::draw_model_line(
                &mut chart,
                &fit.free,
                X_RANGE,
                Y_RANGE,
                true,
                GREEN.stroke_width(2),
                &format!("Fit: {}", fit.free),
            )?;
            series::draw_model_line(
                &mut chart,
                &fit.zero,
                X_RANGE,
                Y_RANGE,
                true,
                MAGENTA.stroke_width(2),
                &format!("Fit through origin: {}", fit.zero),
            )?;
        }
    }

    series::draw_error_bars(&mut chart, normal, floor, NORMAL_COLOR)?;
    series::draw_markers(
        &mut chart,
        normal,
        floor,
        NORMAL_COLOR,
        Marker::Dot,
        SourceClass::Normal.display_name(),
    )?;

    // Non-detections only carry the IR error; the radio value is a limit.
    let limit_bars: Vec<ErrorPoint> = limits.iter().map(|p| ErrorPoint { y_err: 0.0, ..p.clone() }).collect();
    series::draw_error_bars(&mut chart, &limit_bars, floor, LIMIT_COLOR)?;
    series::draw_upper_limits(&mut chart, limits, floor, LIMIT_COLOR)?;
    series::draw_markers(
        &mut chart,
        limits,
        floor,
        LIMIT_COLOR,
        Marker::Dot,
        SourceClass::NonDetected.display_name(),
    )?;

    if config.label_points {
        series::draw_labels(&mut chart, normal, floor)?;
        series::draw_labels(&mut chart, limits, floor)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()?;
    Ok(())
}
