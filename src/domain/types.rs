//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during classification and fitting
//! - exported to JSON/CSV
//! - handed to the chart renderers without further conversion

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Radio SFR (M☉/yr) at or above which a detected source is flagged as an AGN.
pub const DEFAULT_AGN_THRESHOLD: f64 = 1000.0;

/// How the per-row detection indicator is derived from catalog columns.
///
/// Both rules produce the same partition semantics; they only differ in
/// which columns must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionRule {
    /// Use the precomputed `detect` column.
    Combined,
    /// Logical AND of `detect_pix` and `detect_aper`.
    PixelAndAperture,
}

/// How the "intercept held at zero" model is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroInterceptMode {
    /// Two-parameter fit with the intercept boxed into `[0, 1e-10]` and the
    /// slope into `[-10, 10]`.
    Bounded,
    /// One-parameter closed form `y = b·x`.
    Exact,
}

/// Which of the three disjoint subsets a catalog row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceClass {
    NonDetected,
    Normal,
    Flagged,
}

impl SourceClass {
    pub const ALL: [SourceClass; 3] = [SourceClass::Normal, SourceClass::Flagged, SourceClass::NonDetected];

    /// Human-readable label for terminal output and chart legends.
    pub fn display_name(self) -> &'static str {
        match self {
            SourceClass::NonDetected => "Non-Detection Upper Limits",
            SourceClass::Normal => "Detections",
            SourceClass::Flagged => "AGN",
        }
    }

    /// Short machine-friendly label (CSV exports).
    pub fn key(self) -> &'static str {
        match self {
            SourceClass::NonDetected => "non-detected",
            SourceClass::Normal => "normal",
            SourceClass::Flagged => "flagged",
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyRow {
    pub name: String,
    /// Resolved detection indicator (per `DetectionRule`).
    pub detected: bool,
    pub redshift: f64,
    /// 1.5 GHz luminosity (erg s⁻¹ Hz⁻¹).
    pub luminosity: f64,
    pub luminosity_err: f64,
    pub ir_sfr: f64,
    pub ir_sfr_err: f64,
    /// 21 cm (radio continuum) SFR.
    pub radio_sfr: f64,
    pub radio_sfr_err: f64,
}

impl GalaxyRow {
    /// Name up to the first `.`, used for chart annotations.
    pub fn short_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

/// Paired measurements with independent uncertainties on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_err: Vec<f64>,
    pub y_err: Vec<f64>,
}

impl SampleSet {
    /// Build a sample set, rejecting sequences of unequal length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, x_err: Vec<f64>, y_err: Vec<f64>) -> Result<Self, AnalysisError> {
        let n = x.len();
        if y.len() != n || x_err.len() != n || y_err.len() != n {
            return Err(AnalysisError::DegenerateInput(format!(
                "sample sequences differ in length (x={}, y={}, x_err={}, y_err={})",
                n,
                y.len(),
                x_err.len(),
                y_err.len()
            )));
        }
        Ok(Self { x, y, x_err, y_err })
    }

    /// IR SFR (x) versus radio SFR (y) for the given rows.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a GalaxyRow>) -> Self {
        let mut out = Self {
            x: Vec::new(),
            y: Vec::new(),
            x_err: Vec::new(),
            y_err: Vec::new(),
        };
        for row in rows {
            out.x.push(row.ir_sfr);
            out.y.push(row.radio_sfr);
            out.x_err.push(row.ir_sfr_err);
            out.y_err.push(row.radio_sfr_err);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A straight line `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub slope: f64,
}

/// Goodness-of-fit diagnostics against the final combined uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub chi2: f64,
    pub dof: usize,
    pub reduced_chi2: f64,
    pub n: usize,
}

/// Output of the two-pass estimator.
///
/// Only valid for the sample set that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SfrFit {
    /// Free-intercept weighted least squares line.
    pub free: LinearModel,
    /// Line held through the origin (intercept reported as exactly 0).
    pub zero: LinearModel,
    /// Intercept returned by the final constrained solve (inside the bound).
    pub zero_raw_intercept: f64,
    pub zero_mode: ZeroInterceptMode,
    pub free_quality: FitQuality,
    pub zero_quality: FitQuality,
}

/// A full analysis run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub catalog_path: PathBuf,
    pub detection_rule: DetectionRule,
    pub agn_threshold: f64,
    pub zero_intercept: ZeroInterceptMode,
}

/// Options shared by the PNG renderers.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub out_dir: PathBuf,
    /// Annotate each point with the galaxy name.
    pub label_points: bool,
    /// Overlay the fitted lines on the SFR comparison chart.
    pub draw_fits: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_stops_at_first_dot() {
        let row = GalaxyRow {
            name: "J090133.42.field1".to_string(),
            detected: true,
            redshift: 0.1,
            luminosity: 1e22,
            luminosity_err: 1e21,
            ir_sfr: 10.0,
            ir_sfr_err: 1.0,
            radio_sfr: 12.0,
            radio_sfr_err: 2.0,
        };
        assert_eq!(row.short_name(), "J090133");
    }

    #[test]
    fn sample_set_rejects_unequal_lengths() {
        let err = SampleSet::new(vec![1.0, 2.0], vec![1.0], vec![0.1, 0.1], vec![0.1, 0.1]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }
}
