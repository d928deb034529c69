//! Data sources that do not come from a catalog file.

pub mod synthetic;

pub use synthetic::{CatalogSpec, generate_catalog, generate_linear_samples};
