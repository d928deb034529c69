//! Input/output helpers.
//!
//! - catalog CSV ingest + synthetic catalog writer (`catalog`)
//! - fit and classification exports (`export`)

pub mod catalog;
pub mod export;

pub use catalog::*;
pub use export::*;
