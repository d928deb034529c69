//! Reporting utilities: residuals and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

use crate::catalog::{Catalog, Partition};
use crate::domain::{LinearModel, SourceClass};

/// A normal detection compared against a fitted line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResidual {
    pub name: String,
    pub ir_sfr: f64,
    pub radio_sfr: f64,
    pub radio_fit: f64,
    pub residual: f64,
}

/// Residuals of every normal detection against `model`.
pub fn compute_residuals(catalog: &Catalog, partition: &Partition, model: &LinearModel) -> Vec<SourceResidual> {
    partition
        .rows(catalog, SourceClass::Normal)
        .map(|row| {
            let radio_fit = model.predict(row.ir_sfr);
            SourceResidual {
                name: row.name.clone(),
                ir_sfr: row.ir_sfr,
                radio_sfr: row.radio_sfr,
                radio_fit,
                residual: row.radio_sfr - radio_fit,
            }
        })
        .collect()
}
