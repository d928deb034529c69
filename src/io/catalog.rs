//! Catalog CSV ingest.
//!
//! The catalog is produced by an external photometry pipeline, and its column
//! names are a fixed contract. Unlike a best-effort ingest we fail fast: a
//! missing column or an unparseable value aborts the load with
//! `AnalysisError::MalformedCatalog`, naming the line and column.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};

use crate::catalog::Catalog;
use crate::domain::{DetectionRule, GalaxyRow};
use crate::error::{AnalysisError, AppError, EXIT_INPUT};

pub const COL_NAME: &str = "Name";
pub const COL_DETECT: &str = "detect";
pub const COL_DETECT_PIX: &str = "detect_pix";
pub const COL_DETECT_APER: &str = "detect_aper";
pub const COL_Z: &str = "Z";
pub const COL_LUM: &str = "Luminosity";
pub const COL_LUM_ERR: &str = "Luminosity Error (stat.)";
pub const COL_IR_SFR: &str = "IR SFR";
pub const COL_IR_SFR_ERR: &str = "IR SFR Err";
pub const COL_RADIO_SFR: &str = "21 cm SFR";
pub const COL_RADIO_SFR_ERR: &str = "21 cm SFR Error (stat.)";

/// Columns needed regardless of the detection rule.
const MEASUREMENT_COLUMNS: [&str; 8] = [
    COL_NAME,
    COL_Z,
    COL_LUM,
    COL_LUM_ERR,
    COL_IR_SFR,
    COL_IR_SFR_ERR,
    COL_RADIO_SFR,
    COL_RADIO_SFR_ERR,
];

impl DetectionRule {
    /// Catalog columns the rule reads.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            DetectionRule::Combined => &[COL_DETECT],
            DetectionRule::PixelAndAperture => &[COL_DETECT_PIX, COL_DETECT_APER],
        }
    }
}

/// Open and parse a catalog file.
pub fn load_catalog(path: &Path, rule: DetectionRule) -> Result<Catalog, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open catalog '{}': {e}", path.display())))?;
    let catalog = read_catalog(file, rule)?;
    info!(
        "loaded {} catalog rows from {} (detection rule: {:?})",
        catalog.len(),
        path.display(),
        rule
    );
    Ok(catalog)
}

/// Parse a catalog from any reader.
pub fn read_catalog<R: Read>(reader: R, rule: DetectionRule) -> Result<Catalog, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::MalformedCatalog(format!("failed to read header row: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for col in MEASUREMENT_COLUMNS.iter().chain(rule.columns()) {
        if !header_map.contains_key(*col) {
            return Err(AnalysisError::MalformedCatalog(format!("missing required column `{col}`")));
        }
    }

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AnalysisError::MalformedCatalog(format!("line {line}: {e}")))?;
        let row = parse_row(&record, &header_map, rule)
            .map_err(|msg| AnalysisError::MalformedCatalog(format!("line {line}: {msg}")))?;
        if !seen.insert(row.name.clone()) {
            warn!("duplicate catalog name '{}' at line {line}", row.name);
        }
        rows.push(row);
    }

    Ok(Catalog::new(rows, rule))
}

/// Write rows in the catalog schema.
///
/// Both detection-rule column sets are emitted (`detect_pix` and `detect_aper`
/// mirror `detect`), so the output loads under either rule.
pub fn write_catalog(path: &Path, rows: &[GalaxyRow]) -> Result<(), AppError> {
    let io_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write catalog '{}': {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;

    writer
        .write_record([
            COL_NAME,
            COL_DETECT,
            COL_DETECT_PIX,
            COL_DETECT_APER,
            COL_Z,
            COL_LUM,
            COL_LUM_ERR,
            COL_IR_SFR,
            COL_IR_SFR_ERR,
            COL_RADIO_SFR,
            COL_RADIO_SFR_ERR,
        ])
        .map_err(io_err)?;

    for r in rows {
        let flag = if r.detected { "1" } else { "0" };
        writer
            .write_record([
                r.name.clone(),
                flag.to_string(),
                flag.to_string(),
                flag.to_string(),
                format!("{:.5}", r.redshift),
                format!("{:.6e}", r.luminosity),
                format!("{:.6e}", r.luminosity_err),
                format!("{:.4}", r.ir_sfr),
                format!("{:.4}", r.ir_sfr_err),
                format!("{:.4}", r.radio_sfr),
                format!("{:.4}", r.radio_sfr_err),
            ])
            .map_err(io_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush catalog '{}': {e}", path.display())))?;
    Ok(())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    rule: DetectionRule,
) -> Result<GalaxyRow, String> {
    let name = get_required(record, header_map, COL_NAME)?.to_string();

    let detected = match rule {
        DetectionRule::Combined => parse_flag(get_required(record, header_map, COL_DETECT)?, COL_DETECT)?,
        DetectionRule::PixelAndAperture => {
            let pix = parse_flag(get_required(record, header_map, COL_DETECT_PIX)?, COL_DETECT_PIX)?;
            let aper = parse_flag(get_required(record, header_map, COL_DETECT_APER)?, COL_DETECT_APER)?;
            pix && aper
        }
    };

    Ok(GalaxyRow {
        name,
        detected,
        redshift: get_f64(record, header_map, COL_Z)?,
        luminosity: get_f64(record, header_map, COL_LUM)?,
        luminosity_err: get_f64(record, header_map, COL_LUM_ERR)?,
        ir_sfr: get_f64(record, header_map, COL_IR_SFR)?,
        ir_sfr_err: get_f64(record, header_map, COL_IR_SFR_ERR)?,
        radio_sfr: get_f64(record, header_map, COL_RADIO_SFR)?,
        radio_sfr_err: get_f64(record, header_map, COL_RADIO_SFR_ERR)?,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("missing required column `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn get_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    raw.parse::<f64>()
        .map_err(|_| format!("invalid number '{raw}' in `{name}`"))
}

/// Accepts `1`/`0`, `1.0`/`0.0` and `true`/`false` in any case.
fn parse_flag(raw: &str, name: &str) -> Result<bool, String> {
    if raw.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    match raw.parse::<f64>() {
        Ok(v) if v == 1.0 => Ok(true),
        Ok(v) if v == 0.0 => Ok(false),
        _ => Err(format!("invalid detection flag '{raw}' in `{name}` (expected 0/1 or true/false)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Name,detect,detect_pix,detect_aper,Z,Luminosity,Luminosity Error (stat.),IR SFR,IR SFR Err,21 cm SFR,21 cm SFR Error (stat.)";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out.push('\n');
        out
    }

    #[test]
    fn parses_rows_with_either_rule() {
        let csv = csv_with(&[
            "J1.a,1,1,1,0.1,1e22,1e21,50,10,20,3",
            "J2.a,0,1,0,0.2,2e22,1e21,80,16,30,4",
        ]);

        let combined = read_catalog(csv.as_bytes(), DetectionRule::Combined).unwrap();
        assert_eq!(combined.len(), 2);
        assert!(combined.rows()[0].detected);
        assert!(!combined.rows()[1].detected);

        let split = read_catalog(csv.as_bytes(), DetectionRule::PixelAndAperture).unwrap();
        assert!(split.rows()[0].detected);
        assert!(!split.rows()[1].detected, "pixel AND aperture");
        assert_eq!(split.rows()[1].radio_sfr, 30.0);
    }

    #[test]
    fn missing_column_is_malformed() {
        let csv = "Name,detect,Z\nJ1,1,0.1\n";
        let err = read_catalog(csv.as_bytes(), DetectionRule::Combined).unwrap_err();
        match err {
            AnalysisError::MalformedCatalog(msg) => assert!(msg.contains("Luminosity"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rule_specific_columns_are_required() {
        let csv = "Name,detect,Z,Luminosity,Luminosity Error (stat.),IR SFR,IR SFR Err,21 cm SFR,21 cm SFR Error (stat.)\n";
        assert!(read_catalog(csv.as_bytes(), DetectionRule::Combined).is_ok());
        let err = read_catalog(csv.as_bytes(), DetectionRule::PixelAndAperture).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedCatalog(ref m) if m.contains("detect_pix")));
    }

    #[test]
    fn bad_value_reports_line() {
        let csv = csv_with(&["J1,1,1,1,0.1,1e22,1e21,fifty,10,20,3"]);
        let err = read_catalog(csv.as_bytes(), DetectionRule::Combined).unwrap_err();
        match err {
            AnalysisError::MalformedCatalog(msg) => {
                assert!(msg.contains("line 2"), "{msg}");
                assert!(msg.contains("IR SFR"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn header_only_catalog_is_empty() {
        let csv = csv_with(&[]);
        let catalog = read_catalog(csv.as_bytes(), DetectionRule::Combined).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("True", "detect"), Ok(true));
        assert_eq!(parse_flag("0.0", "detect"), Ok(false));
        assert!(parse_flag("2", "detect").is_err());
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let csv = format!("\u{feff}{}", csv_with(&["J1,1,1,1,0.1,1e22,1e21,50,10,20,3"]));
        let catalog = read_catalog(csv.as_bytes(), DetectionRule::Combined).unwrap();
        assert_eq!(catalog.rows()[0].name, "J1");
    }
}
