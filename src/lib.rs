//! `sfr-toolkit` library crate.
//!
//! The binary (`sfr`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the catalog analysis and the CASA script generator can be used separately
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod casa;
pub mod catalog;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
