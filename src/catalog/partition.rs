//! Split a catalog into non-detections, normal detections and flagged sources.
//!
//! Two criteria, applied in order:
//!
//! 1. the detection indicator separates detected from non-detected rows
//! 2. among detected rows, a radio SFR strictly below the threshold is
//!    `Normal`; anything else (at/above the threshold, or NaN) is `Flagged`
//!
//! so every row belongs to exactly one class.

use log::debug;

use crate::catalog::Catalog;
use crate::domain::{GalaxyRow, SourceClass};

/// Three disjoint index views into a `Catalog`.
///
/// Indices are in catalog order within each class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    non_detected: Vec<usize>,
    normal: Vec<usize>,
    flagged: Vec<usize>,
}

/// Class sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionCounts {
    pub normal: usize,
    pub flagged: usize,
    pub non_detected: usize,
}

impl PartitionCounts {
    pub fn total(&self) -> usize {
        self.normal + self.flagged + self.non_detected
    }
}

/// Classify a single row.
pub fn classify(row: &GalaxyRow, threshold: f64) -> SourceClass {
    if !row.detected {
        SourceClass::NonDetected
    } else if row.radio_sfr < threshold {
        SourceClass::Normal
    } else {
        SourceClass::Flagged
    }
}

/// Partition every catalog row. An empty catalog yields three empty classes.
pub fn partition(catalog: &Catalog, threshold: f64) -> Partition {
    let mut out = Partition {
        non_detected: Vec::new(),
        normal: Vec::new(),
        flagged: Vec::new(),
    };

    for (idx, row) in catalog.rows().iter().enumerate() {
        match classify(row, threshold) {
            SourceClass::NonDetected => out.non_detected.push(idx),
            SourceClass::Normal => out.normal.push(idx),
            SourceClass::Flagged => out.flagged.push(idx),
        }
    }

    let counts = out.counts();
    debug!(
        "partition: normal={} flagged={} non-detected={} (threshold {threshold})",
        counts.normal, counts.flagged, counts.non_detected
    );
    out
}

impl Partition {
    /// Row indices of one class.
    pub fn indices(&self, class: SourceClass) -> &[usize] {
        match class {
            SourceClass::NonDetected => &self.non_detected,
            SourceClass::Normal => &self.normal,
            SourceClass::Flagged => &self.flagged,
        }
    }

    /// Borrowed rows of one class.
    ///
    /// `catalog` must be the catalog this partition was built from. Indices
    /// past its end are skipped rather than panicking.
    pub fn rows<'a>(&'a self, catalog: &'a Catalog, class: SourceClass) -> impl Iterator<Item = &'a GalaxyRow> + 'a {
        self.indices(class).iter().filter_map(move |&i| catalog.rows().get(i))
    }

    /// Class of the row at `idx`, or `None` if the index is out of range.
    pub fn class_of(&self, idx: usize) -> Option<SourceClass> {
        SourceClass::ALL
            .into_iter()
            .find(|&class| self.indices(class).binary_search(&idx).is_ok())
    }

    pub fn counts(&self) -> PartitionCounts {
        PartitionCounts {
            normal: self.normal.len(),
            flagged: self.flagged.len(),
            non_detected: self.non_detected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_AGN_THRESHOLD, DetectionRule};

    fn row(name: &str, detected: bool, radio_sfr: f64) -> GalaxyRow {
        GalaxyRow {
            name: name.to_string(),
            detected,
            redshift: 0.1,
            luminosity: 1e22,
            luminosity_err: 1e21,
            ir_sfr: 50.0,
            ir_sfr_err: 10.0,
            radio_sfr,
            radio_sfr_err: 5.0,
        }
    }

    #[test]
    fn five_row_scenario() {
        let flags = [true, true, false, true, false];
        let rows = flags
            .iter()
            .enumerate()
            .map(|(i, &d)| row(&format!("G{i}"), d, 100.0 + i as f64))
            .collect();
        let catalog = Catalog::new(rows, DetectionRule::Combined);

        let p = partition(&catalog, DEFAULT_AGN_THRESHOLD);
        assert_eq!(
            p.counts(),
            PartitionCounts {
                normal: 3,
                flagged: 0,
                non_detected: 2
            }
        );
        assert_eq!(p.indices(SourceClass::NonDetected), &[2, 4]);
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let rows = vec![
            row("a", true, 10.0),
            row("b", true, 5_000.0),
            row("c", false, 5_000.0),
            row("d", true, 1_000.0),
            row("e", true, f64::NAN),
            row("f", false, 1.0),
        ];
        let catalog = Catalog::new(rows, DetectionRule::Combined);
        let p = partition(&catalog, 1_000.0);

        assert_eq!(p.counts().total(), catalog.len());
        for idx in 0..catalog.len() {
            let hits = SourceClass::ALL
                .iter()
                .filter(|&&c| p.indices(c).contains(&idx))
                .count();
            assert_eq!(hits, 1, "row {idx} must be in exactly one class");
        }
        // Exactly-at-threshold and NaN are flagged.
        assert_eq!(p.class_of(3), Some(SourceClass::Flagged));
        assert_eq!(p.class_of(4), Some(SourceClass::Flagged));
        assert_eq!(p.class_of(2), Some(SourceClass::NonDetected));
        assert_eq!(p.class_of(99), None);
    }

    #[test]
    fn empty_catalog_gives_empty_classes() {
        let catalog = Catalog::new(Vec::new(), DetectionRule::PixelAndAperture);
        let p = partition(&catalog, DEFAULT_AGN_THRESHOLD);
        assert_eq!(p.counts().total(), 0);
        assert_eq!(p.rows(&catalog, SourceClass::Normal).count(), 0);
    }

    #[test]
    fn rows_view_borrows_catalog_rows() {
        let catalog = Catalog::new(
            vec![row("x", true, 1.0), row("y", true, 2_000.0)],
            DetectionRule::Combined,
        );
        let p = partition(&catalog, DEFAULT_AGN_THRESHOLD);
        let flagged: Vec<&str> = p.rows(&catalog, SourceClass::Flagged).map(|r| r.name.as_str()).collect();
        assert_eq!(flagged, vec!["y"]);
    }

    #[test]
    fn rows_against_a_shorter_catalog_skips_missing_indices() {
        let full = Catalog::new(
            vec![row("a", true, 10.0), row("b", true, 20.0), row("c", true, 30.0)],
            DetectionRule::Combined,
        );
        let p = partition(&full, DEFAULT_AGN_THRESHOLD);
        let short = Catalog::new(vec![row("x", true, 10.0)], DetectionRule::Combined);

        let names: Vec<&str> = p.rows(&short, SourceClass::Normal).map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["x"]);
    }
}
