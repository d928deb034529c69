//! CASA imaging script generation.
//!
//! For each target directory we write one Python script for CASA
//! (`run_tclean_<name>.py`) holding the requested imaging steps, then a shell
//! driver (`pipelinerun`) that runs every script headless.
//!
//! - `target`: target list parsing and measurement-set discovery
//! - `config`: imaging parameters and per-target overrides
//! - `command`: typed CASA task calls, rendered to Python text on emission
//! - `phase`: step ordering (which steps may follow which)
//! - `generator`: writes the scripts and the driver

pub mod command;
pub mod config;
pub mod generator;
pub mod phase;
pub mod target;

pub use command::{Command, Tclean, Threshold};
pub use config::ImagingConfig;
pub use generator::{DRIVER_FILE_NAME, RunMode, ScriptEntry, ScriptGenerator};
pub use phase::{Phase, PhaseTracker, Step, WriteMode};
pub use target::{Target, discover_targets, parse_target_list, read_target_list};

use std::path::PathBuf;

use thiserror::Error;

use crate::error::{AppError, EXIT_COMPUTE, EXIT_INPUT};

/// Failures while generating scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A step was requested out of order.
    #[error("cannot run step {step:?} after phase {current:?}")]
    PhaseOrder { current: Phase, step: Step },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target directory '{}' does not exist", .0.display())]
    MissingTarget(PathBuf),

    #[error("target '{0}' has no measurement sets (*.ms)")]
    NoMeasurementSets(String),

    #[error("invalid imaging configuration: {0}")]
    Config(String),
}

impl ScriptError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScriptError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ScriptError::PhaseOrder { .. } => EXIT_COMPUTE,
            _ => EXIT_INPUT,
        }
    }
}

impl From<ScriptError> for AppError {
    fn from(err: ScriptError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
