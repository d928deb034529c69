//! Plotting.
//!
//! - `ascii`: fixed-grid terminal scatter plot of normal detections
//! - `sfr_comparison`, `luminosity`, `relative`: PNG charts (plotters bitmap backend)
//!
//! Every PNG renderer takes the catalog plus its partition and writes one file
//! into `PlotConfig::out_dir`, returning the path written.

pub mod ascii;
pub mod luminosity;
pub mod relative;
pub mod series;
pub mod sfr_comparison;

pub use ascii::render_ascii_plot;
pub use luminosity::render_luminosity_redshift;
pub use relative::render_relative_sfr;
pub use sfr_comparison::render_sfr_comparison;

use std::path::PathBuf;

use crate::catalog::{Catalog, Partition};
use crate::domain::{PlotConfig, SfrFit};
use crate::error::{AppError, EXIT_INPUT};

/// Render all three PNG charts.
pub fn render_all(
    catalog: &Catalog,
    partition: &Partition,
    fit: Option<&SfrFit>,
    config: &PlotConfig,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create plot directory '{}': {e}", config.out_dir.display()),
        )
    })?;

    Ok(vec![
        render_sfr_comparison(catalog, partition, fit, config)?,
        render_luminosity_redshift(catalog, partition, config)?,
        render_relative_sfr(catalog, partition, config)?,
    ])
}
