//! In-memory catalog and its classification into source classes.

pub mod partition;

pub use partition::*;

use crate::domain::{DetectionRule, GalaxyRow};

/// Rows loaded from one catalog file.
///
/// Rows are never mutated after load; the partition refers to them by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    rows: Vec<GalaxyRow>,
    rule: DetectionRule,
}

impl Catalog {
    pub fn new(rows: Vec<GalaxyRow>, rule: DetectionRule) -> Self {
        Self { rows, rule }
    }

    pub fn rows(&self) -> &[GalaxyRow] {
        &self.rows
    }

    /// Detection rule the rows were resolved with.
    pub fn rule(&self) -> DetectionRule {
        self.rule
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
