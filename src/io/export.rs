//! Export fit results (JSON) and per-row classes (CSV).
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Partition};
use crate::domain::{AnalysisConfig, DetectionRule, SfrFit, SourceClass};
use crate::error::{AppError, EXIT_COMPUTE, EXIT_INPUT};

/// Portable record of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub catalog: PathBuf,
    pub detection_rule: DetectionRule,
    pub agn_threshold: f64,
    pub n_normal: usize,
    pub n_flagged: usize,
    pub n_non_detected: usize,
    pub fit: SfrFit,
}

/// Write the fit JSON file.
pub fn write_fit_json(path: &Path, fit: &SfrFit, partition: &Partition, config: &AnalysisConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    let counts = partition.counts();
    let record = FitFile {
        tool: "sfr".to_string(),
        generated: Utc::now(),
        catalog: config.catalog_path.clone(),
        detection_rule: config.detection_rule,
        agn_threshold: config.agn_threshold,
        n_normal: counts.normal,
        n_flagged: counts.flagged,
        n_non_detected: counts.non_detected,
        fit: fit.clone(),
    };

    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write fit JSON: {e}")))?;
    Ok(())
}

/// Read a fit JSON file written by `write_fit_json`.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to parse fit JSON: {e}")))
}

/// Write one record per catalog row with its class and, for normal
/// detections, the residual against the free-intercept fit.
pub fn write_classes_csv(
    path: &Path,
    catalog: &Catalog,
    partition: &Partition,
    fit: Option<&SfrFit>,
) -> Result<(), AppError> {
    let io_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write class CSV '{}': {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;

    writer
        .write_record(["name", "class", "ir_sfr", "radio_sfr", "radio_fit", "residual"])
        .map_err(io_err)?;

    for (idx, row) in catalog.rows().iter().enumerate() {
        let class = partition
            .class_of(idx)
            .ok_or_else(|| AppError::new(EXIT_COMPUTE, format!("Row {idx} is missing from the partition.")))?;
        let (radio_fit, residual) = match (class, fit) {
            (SourceClass::Normal, Some(fit)) => {
                let y_fit = fit.free.predict(row.ir_sfr);
                (format!("{y_fit:.4}"), format!("{:.4}", row.radio_sfr - y_fit))
            }
            _ => (String::new(), String::new()),
        };
        writer
            .write_record([
                row.name.clone(),
                class.key().to_string(),
                format!("{:.4}", row.ir_sfr),
                format!("{:.4}", row.radio_sfr),
                radio_fit,
                residual,
            ])
            .map_err(io_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush class CSV '{}': {e}", path.display())))?;
    Ok(())
}
