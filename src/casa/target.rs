//! Imaging targets and their measurement sets.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::casa::ScriptError;

/// One target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Directory name, also the CASA image name.
    pub name: String,
    pub dir: PathBuf,
    /// Entries of `dir` whose name contains `.ms`, sorted.
    pub measurement_sets: Vec<String>,
}

impl Target {
    /// Name up to the first `.`.
    pub fn script_stem(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn script_file_name(&self) -> String {
        format!("run_tclean_{}.py", self.script_stem())
    }
}

/// Target names, one per line. Blank lines and `#` comments are ignored.
pub fn parse_target_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_target_list(path: &Path) -> Result<Vec<String>, ScriptError> {
    let text = fs::read_to_string(path).map_err(|e| ScriptError::io(path, e))?;
    Ok(parse_target_list(&text))
}

/// Resolve each name to `<root>/<name>` and list its measurement sets.
pub fn discover_targets(root: &Path, names: &[String]) -> Result<Vec<Target>, ScriptError> {
    let mut targets = Vec::with_capacity(names.len());
    for name in names {
        if targets.iter().any(|t: &Target| &t.name == name) {
            warn!("target '{name}' listed more than once; keeping the first");
            continue;
        }

        let dir = root.join(name);
        if !dir.is_dir() {
            return Err(ScriptError::MissingTarget(dir));
        }

        let mut measurement_sets = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| ScriptError::io(&dir, e))? {
            let entry = entry.map_err(|e| ScriptError::io(&dir, e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.contains(".ms") {
                measurement_sets.push(file_name);
            }
        }
        measurement_sets.sort();
        if measurement_sets.is_empty() {
            return Err(ScriptError::NoMeasurementSets(name.clone()));
        }
        debug!("target {name}: {} measurement set(s)", measurement_sets.len());

        targets.push(Target {
            name: name.clone(),
            dir,
            measurement_sets,
        });
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_skips_blanks_and_comments() {
        let names = parse_target_list("# survey fields\nJ1.a\n\n  J2  # bright\n#J3\n");
        assert_eq!(names, vec!["J1.a", "J2"]);
    }

    #[test]
    fn script_name_uses_prefix_before_first_dot() {
        let t = Target {
            name: "J090133.42".to_string(),
            dir: PathBuf::from("J090133.42"),
            measurement_sets: vec![],
        };
        assert_eq!(t.script_file_name(), "run_tclean_J090133.py");
    }

    #[test]
    fn discovers_sorted_measurement_sets() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("J1");
        fs::create_dir_all(dir.join("b.ms")).unwrap();
        fs::create_dir_all(dir.join("a.ms")).unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();
        fs::write(dir.join("c.ms.flagversions"), "x").unwrap();

        let targets = discover_targets(root.path(), &["J1".to_string()]).unwrap();
        assert_eq!(targets[0].measurement_sets, vec!["a.ms", "b.ms", "c.ms.flagversions"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = discover_targets(root.path(), &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ScriptError::MissingTarget(_)));
    }

    #[test]
    fn directory_without_measurement_sets_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("J2")).unwrap();
        let err = discover_targets(root.path(), &["J2".to_string()]).unwrap_err();
        assert!(matches!(err, ScriptError::NoMeasurementSets(ref n) if n == "J2"));
    }
}
