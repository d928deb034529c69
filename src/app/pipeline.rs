//! Shared analysis pipeline used by `sfr fit` and `sfr plot`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! catalog load -> classification -> fit -> residuals
//!
//! The subcommands can then focus on presentation (printing vs charts).
//! Charting tolerates a missing fit; `sfr fit` does not.

use log::warn;

use crate::catalog::{Catalog, Partition, partition};
use crate::domain::{AnalysisConfig, SampleSet, SfrFit, SourceClass};
use crate::error::{AnalysisError, AppError, EXIT_INPUT};
use crate::fit::{FitOptions, fit_sfr_relation};
use crate::io::load_catalog;
use crate::report::{SourceResidual, compute_residuals};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub catalog: Catalog,
    pub partition: Partition,
    pub fit: SfrFit,
    /// Normal detections against the free-intercept line.
    pub residuals: Vec<SourceResidual>,
}

/// Catalog, partition and (when the data allow it) the fit, for charting.
#[derive(Debug, Clone)]
pub struct PlotInputs {
    pub catalog: Catalog,
    pub partition: Partition,
    pub fit: Option<SfrFit>,
}

/// Load, classify and fit.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let catalog = load_catalog(&config.catalog_path, config.detection_rule)?;
    analyze_catalog(catalog, config)
}

/// Classify and fit an already loaded catalog.
pub fn analyze_catalog(catalog: Catalog, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let partition = classify(&catalog, config)?;
    let fit = fit_normal(&catalog, &partition, config)?;

    let residuals = compute_residuals(&catalog, &partition, &fit.free);
    Ok(RunOutput {
        catalog,
        partition,
        fit,
        residuals,
    })
}

/// Load and classify for charting. The fit is optional: the charts only need
/// it for the fitted lines, so a catalog too small or too degenerate to fit
/// still gets plotted unless `require_fit` is set.
pub fn prepare_plot(config: &AnalysisConfig, require_fit: bool) -> Result<PlotInputs, AppError> {
    let catalog = load_catalog(&config.catalog_path, config.detection_rule)?;
    plot_inputs(catalog, config, require_fit)
}

pub fn plot_inputs(catalog: Catalog, config: &AnalysisConfig, require_fit: bool) -> Result<PlotInputs, AppError> {
    let partition = classify(&catalog, config)?;
    let fit = match fit_normal(&catalog, &partition, config) {
        Ok(fit) => Some(fit),
        Err(
            err @ (AnalysisError::InsufficientSamples { .. } | AnalysisError::DegenerateInput(_)),
        ) if !require_fit => {
            warn!("no fit available, plotting data only: {err}");
            None
        }
        Err(err) => return Err(err.into()),
    };
    Ok(PlotInputs {
        catalog,
        partition,
        fit,
    })
}

fn classify(catalog: &Catalog, config: &AnalysisConfig) -> Result<Partition, AppError> {
    if !config.agn_threshold.is_finite() {
        return Err(AppError::new(EXIT_INPUT, "AGN threshold must be finite."));
    }
    Ok(partition(catalog, config.agn_threshold))
}

fn fit_normal(catalog: &Catalog, partition: &Partition, config: &AnalysisConfig) -> Result<SfrFit, AnalysisError> {
    let samples = SampleSet::from_rows(partition.rows(catalog, SourceClass::Normal));
    let opts = FitOptions {
        zero_intercept: config.zero_intercept,
        ..FitOptions::default()
    };
    let fit = fit_sfr_relation(&samples, &opts)?;

    if fit.free_quality.reduced_chi2 > 10.0 {
        warn!(
            "free-intercept fit has reduced chi² {:.2}; uncertainties may be underestimated",
            fit.free_quality.reduced_chi2
        );
    }
    Ok(fit)
}
