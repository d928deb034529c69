//! Mathematical utilities: weighted least squares and its box-constrained variant.

pub mod bounded;
pub mod ols;

pub use bounded::*;
pub use ols::*;
