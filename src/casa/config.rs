//! Imaging parameters.
//!
//! Defaults reproduce the survey's standard setup: a 12000 px frame at
//! 0.2"/px (about 40', a bit larger than the primary beam) and a 200 px (40")
//! cutout at the phase centre. A few fields with bright off-axis sources need a
//! larger frame, and a few with strong residual sidelobes need a higher
//! auto-masking sidelobe threshold; both are per-target overrides.
//!
//! Any subset of fields may be given in a JSON file; missing fields keep
//! their defaults.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::casa::ScriptError;

const LARGER_FRAME: [&str; 8] = [
    "J134136.79",
    "J090842.76",
    "J010624.25",
    "J090133.42",
    "J121955.77",
    "J123215.82",
    "J211625.14",
    "J211824.06",
];
const LARGEST_FRAME: [&str; 2] = ["J112518.89", "J214000.49"];
const STRONG_SIDELOBES: [&str; 7] = [
    "J122949.83",
    "J090133.42",
    "J094417.84",
    "J112518.89",
    "J211824.06",
    "J214000.49",
    "J134136.79",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// Clean threshold in units of the MAD-estimated noise (`σ·1.4826·MAD`).
    pub clean_sigma: f64,
    /// Image side length in pixels.
    pub image_size: u32,
    /// Cutout side length in pixels.
    pub cutout_size: u32,
    pub cell: String,
    /// Per-target image sizes.
    pub size_overrides: BTreeMap<String, u32>,
    pub sidelobe_threshold: f64,
    /// Per-target auto-multithresh sidelobe thresholds.
    pub sidelobe_overrides: BTreeMap<String, f64>,
    pub clean_niter: u32,
    pub wprojplanes: u32,
    pub robust: f64,
    /// Multi-scale clean scales (pixels).
    pub scales: Vec<u32>,
    /// Passed to `casa -r` by the driver.
    pub casa_version: String,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        let size_overrides = LARGER_FRAME
            .iter()
            .map(|n| (n.to_string(), 14_000))
            .chain(LARGEST_FRAME.iter().map(|n| (n.to_string(), 15_000)))
            .collect();
        let sidelobe_overrides = STRONG_SIDELOBES.iter().map(|n| (n.to_string(), 5.0)).collect();

        Self {
            clean_sigma: 3.0,
            image_size: 12_000,
            cutout_size: 200,
            cell: "0.2arcsec".to_string(),
            size_overrides,
            sidelobe_threshold: 3.0,
            sidelobe_overrides,
            clean_niter: 20_000,
            wprojplanes: 128,
            robust: 0.5,
            scales: vec![0, 11, 28],
            casa_version: "5.3.0-143".to_string(),
        }
    }
}

impl ImagingConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let file = File::open(path).map_err(|e| ScriptError::io(path, e))?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| ScriptError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        debug!("loaded imaging config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        if !(self.clean_sigma.is_finite() && self.clean_sigma > 0.0) {
            return Err(ScriptError::Config(format!(
                "clean_sigma must be finite and > 0 (got {})",
                self.clean_sigma
            )));
        }
        if self.cutout_size == 0 {
            return Err(ScriptError::Config("cutout_size must be > 0".to_string()));
        }
        let sizes = std::iter::once(("default", self.image_size))
            .chain(self.size_overrides.iter().map(|(k, v)| (k.as_str(), *v)));
        for (name, size) in sizes {
            if size < self.cutout_size {
                return Err(ScriptError::Config(format!(
                    "image size {size} for {name} is smaller than the cutout ({})",
                    self.cutout_size
                )));
            }
        }
        if self.cell.trim().is_empty() {
            return Err(ScriptError::Config("cell must not be empty".to_string()));
        }
        if self.casa_version.trim().is_empty() {
            return Err(ScriptError::Config("casa_version must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn image_size_for(&self, name: &str) -> u32 {
        self.size_overrides.get(name).copied().unwrap_or(self.image_size)
    }

    /// Pixel box `[lo, hi]` (same on both axes) of the centred cutout.
    pub fn cutout_frame(&self, name: &str) -> (u32, u32) {
        let size = self.image_size_for(name);
        (size / 2 - self.cutout_size / 2, size / 2 + self.cutout_size / 2)
    }

    pub fn sidelobe_threshold_for(&self, name: &str) -> f64 {
        self.sidelobe_overrides
            .get(name)
            .copied()
            .unwrap_or(self.sidelobe_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let c = ImagingConfig::default();
        assert_eq!(c.image_size_for("J000000.00"), 12_000);
        assert_eq!(c.image_size_for("J134136.79"), 14_000);
        assert_eq!(c.image_size_for("J214000.49"), 15_000);
        assert_eq!(c.sidelobe_threshold_for("J000000.00"), 3.0);
        assert_eq!(c.sidelobe_threshold_for("J094417.84"), 5.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn cutout_frame_is_centred() {
        let c = ImagingConfig::default();
        assert_eq!(c.cutout_frame("J000000.00"), (5_900, 6_100));
        assert_eq!(c.cutout_frame("J090842.76"), (6_900, 7_100));
        assert_eq!(c.cutout_frame("J112518.89"), (7_400, 7_600));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: ImagingConfig = serde_json::from_str(r#"{"clean_sigma": 5, "scales": [0, 5]}"#).unwrap();
        assert_eq!(c.clean_sigma, 5.0);
        assert_eq!(c.scales, vec![0, 5]);
        assert_eq!(c.image_size, 12_000);
        assert_eq!(c.image_size_for("J112518.89"), 15_000);
    }

    #[test]
    fn cutout_larger_than_image_is_rejected() {
        let c = ImagingConfig {
            cutout_size: 20_000,
            ..ImagingConfig::default()
        };
        assert!(matches!(c.validate(), Err(ScriptError::Config(_))));
    }
}
