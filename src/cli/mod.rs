//! Command-line parsing for the SFR toolkit.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analysis and script-generation code. Paths that are usually fixed per
//! machine can also come from the environment (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::casa::RunMode;
use crate::domain::{DEFAULT_AGN_THRESHOLD, DetectionRule, ZeroInterceptMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sfr",
    version,
    about = "Radio vs IR star-formation-rate analysis and CASA imaging script generation"
)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify the catalog, fit radio SFR against IR SFR and print diagnostics.
    Fit(FitArgs),
    /// Render the PNG charts (SFR comparison, luminosity vs redshift, relative SFR).
    Plot(PlotArgs),
    /// Generate per-target CASA imaging scripts and the `pipelinerun` driver.
    Scripts(ScriptsArgs),
    /// Write a synthetic catalog CSV.
    Simulate(SimulateArgs),
}

/// Catalog and classification options shared by `fit` and `plot`.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// Catalog CSV file.
    #[arg(short = 'c', long, env = "SFR_CATALOG", value_name = "CSV")]
    pub catalog: PathBuf,

    /// How the detection indicator is read from the catalog.
    #[arg(long, value_enum, default_value_t = DetectionRule::Combined)]
    pub detection_rule: DetectionRule,

    /// Radio SFR at or above which a detection is flagged as an AGN.
    #[arg(long, default_value_t = DEFAULT_AGN_THRESHOLD)]
    pub agn_threshold: f64,

    /// How the zero-intercept line is solved.
    #[arg(long, value_enum, default_value_t = ZeroInterceptMode::Bounded)]
    pub zero_intercept: ZeroInterceptMode,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Show the N largest residuals.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Export the fit result to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,

    /// Export per-row class assignments (and residuals) to CSV.
    #[arg(long = "export-classes", value_name = "CSV")]
    pub export_classes: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Directory the PNG files are written to.
    #[arg(short, long, env = "SFR_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Do not annotate points with galaxy names.
    #[arg(long)]
    pub no_labels: bool,

    /// Overlay both fitted lines on the SFR comparison chart.
    #[arg(long)]
    pub draw_fits: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ScriptsArgs {
    /// Target names (directories under --root).
    pub targets: Vec<String>,

    /// File with one target name per line.
    #[arg(short = 't', long, value_name = "FILE")]
    pub targets_file: Option<PathBuf>,

    /// Directory holding the target directories.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Which steps to generate.
    #[arg(short, long, value_enum, default_value_t = RunMode::Suite)]
    pub mode: RunMode,

    /// Imaging configuration JSON (defaults are used for missing fields).
    #[arg(long, env = "SFR_CASA_CONFIG", value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Directory the `pipelinerun` driver is written to.
    #[arg(short, long, env = "SFR_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Print the effective imaging configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Output catalog CSV.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    #[arg(short = 'n', long, default_value_t = 30)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that a source is detected.
    #[arg(long, default_value_t = 0.7)]
    pub detect_prob: f64,

    /// Probability that a detected source is an AGN.
    #[arg(long, default_value_t = 0.1)]
    pub agn_prob: f64,

    /// IR-to-radio suppression factor.
    #[arg(long, default_value_t = 2.5)]
    pub suppression: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_with_defaults() {
        let cli = Cli::parse_from(["sfr", "fit", "--catalog", "cat.csv"]);
        match cli.command {
            Command::Fit(args) => {
                assert_eq!(args.analysis.catalog, PathBuf::from("cat.csv"));
                assert_eq!(args.analysis.detection_rule, DetectionRule::Combined);
                assert_eq!(args.analysis.agn_threshold, 1000.0);
                assert_eq!(args.analysis.zero_intercept, ZeroInterceptMode::Bounded);
                assert!(args.plot && !args.no_plot);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_scripts_targets_and_mode() {
        let cli = Cli::parse_from(["sfr", "-v", "scripts", "J1", "J2", "--mode", "clean", "--root", "/data"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Scripts(args) => {
                assert_eq!(args.targets, vec!["J1", "J2"]);
                assert_eq!(args.mode, RunMode::Clean);
                assert_eq!(args.root, PathBuf::from("/data"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn detection_rule_is_kebab_case() {
        let cli = Cli::parse_from([
            "sfr",
            "plot",
            "-c",
            "cat.csv",
            "--detection-rule",
            "pixel-and-aperture",
            "--draw-fits",
        ]);
        match cli.command {
            Command::Plot(args) => {
                assert_eq!(args.analysis.detection_rule, DetectionRule::PixelAndAperture);
                assert!(args.draw_fits);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
