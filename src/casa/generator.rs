//! Script and driver generation.
//!
//! Each step is written for every target before the next step starts, so the
//! phase tracker is shared by the whole run. Scripts are registered for the
//! driver when they are created, which happens only at the first step of a run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::casa::command::{Command, TEXT_DIR, Tclean, Threshold};
use crate::casa::config::ImagingConfig;
use crate::casa::phase::{Phase, PhaseTracker, Step, WriteMode};
use crate::casa::target::Target;
use crate::casa::ScriptError;

pub const DRIVER_FILE_NAME: &str = "pipelinerun";

/// Which steps to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Dirty image through statistics.
    Suite,
    /// Dirty image and threshold only.
    Dirty,
    /// Clean, primary-beam correction, cutouts and statistics, reusing a
    /// previous dirty run's PSF, residual and threshold.
    Clean,
}

impl RunMode {
    pub fn steps(self) -> &'static [Step] {
        match self {
            RunMode::Suite => &[Step::Dirty, Step::Clean, Step::PbCor, Step::Cutout, Step::Stats],
            RunMode::Dirty => &[Step::Dirty],
            RunMode::Clean => &[Step::Clean, Step::PbCor, Step::Cutout, Step::Stats],
        }
    }
}

/// A script registered for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub dir: PathBuf,
    pub script: PathBuf,
}

pub struct ScriptGenerator<'a> {
    config: &'a ImagingConfig,
    tracker: PhaseTracker,
    scripts: Vec<ScriptEntry>,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(config: &'a ImagingConfig) -> Self {
        Self {
            config,
            tracker: PhaseTracker::new(),
            scripts: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.tracker.phase()
    }

    /// Scripts created so far, in creation order.
    pub fn scripts(&self) -> &[ScriptEntry] {
        &self.scripts
    }

    /// Write every step of `mode` for all targets.
    pub fn run(&mut self, mode: RunMode, targets: &[Target]) -> Result<(), ScriptError> {
        for &step in mode.steps() {
            self.run_step(step, targets)?;
        }
        info!(
            "generated {:?} scripts for {} target(s) (phase {:?})",
            mode,
            targets.len(),
            self.phase()
        );
        Ok(())
    }

    /// Write one step for all targets.
    pub fn run_step(&mut self, step: Step, targets: &[Target]) -> Result<(), ScriptError> {
        let mode = self.tracker.advance(step)?;
        debug!("step {step:?}: {mode:?}");

        for target in targets {
            if step == Step::Dirty {
                let text_dir = target.dir.join(TEXT_DIR);
                fs::create_dir_all(&text_dir).map_err(|e| ScriptError::io(&text_dir, e))?;
            }

            let path = target.dir.join(target.script_file_name());
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(mode == WriteMode::Overwrite)
                .append(mode == WriteMode::Append)
                .open(&path)
                .map_err(|e| ScriptError::io(&path, e))?;

            for command in commands_for(step, target, self.config) {
                file.write_all(command.render().as_bytes())
                    .map_err(|e| ScriptError::io(&path, e))?;
            }

            if mode == WriteMode::Overwrite {
                let dir = fs::canonicalize(&target.dir).map_err(|e| ScriptError::io(&target.dir, e))?;
                let script = dir.join(target.script_file_name());
                self.scripts.push(ScriptEntry { dir, script });
            }
        }
        Ok(())
    }

    /// Write the driver into `out_dir` and return its path.
    pub fn write_driver(&self, out_dir: &Path) -> Result<PathBuf, ScriptError> {
        let path = out_dir.join(DRIVER_FILE_NAME);
        let text = render_driver(&self.scripts, &self.config.casa_version, Utc::now());
        fs::write(&path, text).map_err(|e| ScriptError::io(&path, e))?;
        info!("wrote {} ({} script(s))", path.display(), self.scripts.len());
        Ok(path)
    }
}

/// CASA commands for one step of one target.
pub fn commands_for(step: Step, target: &Target, config: &ImagingConfig) -> Vec<Command> {
    let name = target.name.as_str();
    let image = format!("{name}.image.tt0");
    let pbcor_image = format!("{name}.pbcor.image.tt0");

    let tclean = |niter, threshold, sidelobe_threshold, calc_psf_and_residual| Tclean {
        vis: target.measurement_sets.clone(),
        imagename: name.to_string(),
        imsize: config.image_size_for(name),
        cell: config.cell.clone(),
        wprojplanes: config.wprojplanes,
        robust: config.robust,
        scales: config.scales.clone(),
        niter,
        threshold,
        sidelobe_threshold,
        calc_psf_and_residual,
    };

    match step {
        Step::Dirty => vec![
            Command::Tclean(tclean(0, Threshold::Literal("0.0Jy".to_string()), None, true)),
            Command::MadThreshold {
                image,
                sigma: config.clean_sigma,
            },
        ],
        Step::Clean => vec![
            Command::LoadThreshold,
            Command::Tclean(tclean(
                config.clean_niter,
                Threshold::Runtime,
                Some(config.sidelobe_threshold_for(name)),
                false,
            )),
        ],
        Step::PbCor => vec![Command::WidebandPbcor {
            vis: target.measurement_sets.first().cloned().unwrap_or_default(),
            imagename: name.to_string(),
            threshold: Threshold::Runtime,
        }],
        Step::Cutout => {
            let frame = config.cutout_frame(name);
            vec![
                Command::ImSubImage {
                    image: pbcor_image.clone(),
                    outfile: format!("{name}.cutout.pbcor"),
                    frame,
                },
                Command::ImSubImage {
                    image: image.clone(),
                    outfile: format!("{name}.cutout"),
                    frame,
                },
                Command::ExportFits {
                    image: format!("{name}.cutout.pbcor"),
                    fits: format!("{name}.cutout.pbcor.fits"),
                },
                Command::ExportFits {
                    image: format!("{name}.cutout"),
                    fits: format!("{name}.cutout.fits"),
                },
                Command::ExportFits {
                    image: pbcor_image,
                    fits: format!("{name}.pbcor.fits"),
                },
                Command::ExportFits {
                    image,
                    fits: format!("{name}.fits"),
                },
            ]
        }
        Step::Stats => vec![Command::NoiseAndBeam { image }],
    }
}

/// Driver text: one headless CASA invocation per script.
pub fn render_driver(scripts: &[ScriptEntry], casa_version: &str, generated: DateTime<Utc>) -> String {
    let mut out = format!("# generated {}\n", generated.to_rfc3339());
    for entry in scripts {
        out.push_str(&format!(
            "cd {}; xvfb-run -d casa -r {casa_version} --nogui -c {}\n",
            shell_quote(&entry.dir),
            shell_quote(&entry.script)
        ));
    }
    out
}

/// Single-quote a path for POSIX sh. Embedded quotes become `'\''`.
fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn target(root: &Path, name: &str) -> Target {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("obs.ms")).unwrap();
        Target {
            name: name.to_string(),
            dir,
            measurement_sets: vec!["obs.ms".to_string()],
        }
    }

    #[test]
    fn driver_lines() {
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let scripts = vec![ScriptEntry {
            dir: PathBuf::from("/data/J1"),
            script: PathBuf::from("/data/J1/run_tclean_J1.py"),
        }];
        let text = render_driver(&scripts, "5.3.0-143", when);
        assert_eq!(
            text,
            "# generated 2024-01-02T03:04:05+00:00\n\
             cd '/data/J1'; xvfb-run -d casa -r 5.3.0-143 --nogui -c '/data/J1/run_tclean_J1.py'\n"
        );
    }

    #[test]
    fn driver_quotes_paths_with_spaces_and_quotes() {
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let scripts = vec![ScriptEntry {
            dir: PathBuf::from("/data/my run/J1"),
            script: PathBuf::from("/data/my run/J1/it's.py"),
        }];
        let text = render_driver(&scripts, "5.3.0-143", when);
        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "cd '/data/my run/J1'; xvfb-run -d casa -r 5.3.0-143 --nogui -c '/data/my run/J1/it'\\''s.py'"
        );
    }

    #[test]
    fn suite_writes_all_steps_into_one_script() {
        let root = tempfile::tempdir().unwrap();
        let targets = vec![target(root.path(), "J1.a"), target(root.path(), "J2")];
        let config = ImagingConfig::default();

        let mut generator = ScriptGenerator::new(&config);
        generator.run(RunMode::Suite, &targets).unwrap();
        assert_eq!(generator.phase(), Phase::StatsDone);
        assert_eq!(generator.scripts().len(), 2, "registered once per target");

        let script = fs::read_to_string(root.path().join("J1.a").join("run_tclean_J1.py")).unwrap();
        let order = ["tclean(", "thresh=", "threshold=float", "widebandpbcor(", "imsubimage(", "exportfits(", "beamarea"];
        let mut last = 0;
        for needle in order {
            let at = script[last..].find(needle).map(|i| i + last);
            assert!(at.is_some(), "missing or out of order: {needle}");
            last = at.unwrap_or(last);
        }
        assert!(root.path().join("J1.a").join("text").is_dir());
    }

    #[test]
    fn clean_run_overwrites_previous_script() {
        let root = tempfile::tempdir().unwrap();
        let targets = vec![target(root.path(), "J1")];
        let config = ImagingConfig::default();

        ScriptGenerator::new(&config).run(RunMode::Dirty, &targets).unwrap();
        let mut generator = ScriptGenerator::new(&config);
        generator.run(RunMode::Clean, &targets).unwrap();

        let script = fs::read_to_string(root.path().join("J1").join("run_tclean_J1.py")).unwrap();
        assert!(script.starts_with("with open('text/threshold.txt', 'r')"));
        assert!(!script.contains("niter=0,"));
        assert_eq!(generator.scripts().len(), 1);
    }

    #[test]
    fn out_of_order_step_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let targets = vec![target(root.path(), "J1")];
        let config = ImagingConfig::default();

        let mut generator = ScriptGenerator::new(&config);
        generator.run_step(Step::Dirty, &targets).unwrap();
        let before = fs::read_to_string(root.path().join("J1").join("run_tclean_J1.py")).unwrap();

        let err = generator.run_step(Step::Stats, &targets).unwrap_err();
        assert!(matches!(err, ScriptError::PhaseOrder { .. }));
        let after = fs::read_to_string(root.path().join("J1").join("run_tclean_J1.py")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn overrides_reach_the_commands() {
        let t = Target {
            name: "J112518.89".to_string(),
            dir: PathBuf::from("J112518.89"),
            measurement_sets: vec!["x.ms".to_string()],
        };
        let config = ImagingConfig::default();

        let clean = commands_for(Step::Clean, &t, &config);
        match &clean[1] {
            Command::Tclean(tc) => {
                assert_eq!(tc.imsize, 15_000);
                assert_eq!(tc.sidelobe_threshold, Some(5.0));
                assert_eq!(tc.threshold, Threshold::Runtime);
            }
            other => panic!("expected tclean, got {other:?}"),
        }

        let cutout = commands_for(Step::Cutout, &t, &config);
        assert!(matches!(cutout[0], Command::ImSubImage { frame: (7_400, 7_600), .. }));
    }
}
