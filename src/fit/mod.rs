//! Fitting of the radio-vs-IR star-formation-rate relation.
//!
//! Responsibilities:
//!
//! - validate the sample set (size, uncertainties, x spread)
//! - two-pass free-intercept fit with propagated x-uncertainty
//! - two-pass zero-intercept fit (bounded or exact)

pub mod linear;

pub use linear::*;
