//! Terminal formatting for analysis runs.

use crate::catalog::{Catalog, Partition};
use crate::domain::{AnalysisConfig, FitQuality, SfrFit, SourceClass, ZeroInterceptMode};
use crate::report::SourceResidual;

/// Format the full run summary (catalog counts + fit diagnostics).
pub fn format_run_summary(catalog: &Catalog, partition: &Partition, fit: &SfrFit, config: &AnalysisConfig) -> String {
    let mut out = String::new();
    let counts = partition.counts();

    out.push_str("=== sfr - radio vs IR star formation rates ===\n");
    out.push_str(&format!("Catalog: {}\n", config.catalog_path.display()));
    out.push_str(&format!("Detection rule: {:?}\n", catalog.rule()));
    out.push_str(&format!(
        "Rows: n={} | normal={} | flagged={} (radio SFR >= {}) | non-detected={}\n",
        catalog.len(),
        counts.normal,
        counts.flagged,
        config.agn_threshold,
        counts.non_detected
    ));

    out.push_str("\nFits to normal detections:\n");
    out.push_str(&format!("- free intercept : y = {}  {}\n", fit.free, fmt_quality(&fit.free_quality)));
    out.push_str(&format!("- zero intercept : y = {}  {}\n", fit.zero, fmt_quality(&fit.zero_quality)));
    if fit.zero_mode == ZeroInterceptMode::Bounded {
        out.push_str(&format!(
            "  (bounded solve, solver intercept {:.3e})\n",
            fit.zero_raw_intercept
        ));
    }
    if fit.zero.slope != 0.0 {
        out.push_str(&format!(
            "- implied radio suppression: x{:.3}\n",
            1.0 / fit.zero.slope
        ));
    }
    out.push('\n');

    out
}

/// Format the per-class source lists.
pub fn format_partition(catalog: &Catalog, partition: &Partition) -> String {
    let mut out = String::new();
    for class in SourceClass::ALL {
        let rows: Vec<_> = partition.rows(catalog, class).collect();
        out.push_str(&format!("{} ({}):\n", class.display_name(), rows.len()));
        for r in rows {
            out.push_str(&format!(
                "  {:<20} z={:<7.4} IR={:>10.2} radio={:>10.2}\n",
                truncate(&r.name, 20),
                r.redshift,
                r.ir_sfr,
                r.radio_sfr
            ));
        }
    }
    out
}

/// Format residuals of normal detections, largest absolute first.
pub fn format_residuals(residuals: &[SourceResidual], top_n: usize) -> String {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .abs()
            .partial_cmp(&a.residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    out.push_str(format!("{:<20} {:>10} {:>10} {:>10} {:>10}", "name", "ir_sfr", "radio", "fit", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<20} {:-<10} {:-<10} {:-<10} {:-<10}", "", "", "", "", "").trim_end());
    out.push('\n');
    for r in sorted.iter().take(top_n) {
        out.push_str(
            format!(
                "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                truncate(&r.name, 20),
                r.ir_sfr,
                r.radio_sfr,
                r.radio_fit,
                r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_quality(q: &FitQuality) -> String {
    format!("chi2={:.3} dof={} chi2/dof={:.3}", q.chi2, q.dof, q.reduced_chi2)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
