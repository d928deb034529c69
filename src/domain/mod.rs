//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`DetectionRule`, `ZeroInterceptMode`)
//! - catalog rows and their classes (`GalaxyRow`, `SourceClass`)
//! - fit inputs and outputs (`SampleSet`, `LinearModel`, `SfrFit`)

pub mod types;

pub use types::*;
