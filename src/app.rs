//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the analysis pipeline, chart rendering or script generation
//! - writes optional exports

use clap::Parser;
use log::{debug, info};

use crate::casa::{ImagingConfig, ScriptGenerator, discover_targets, read_target_list};
use crate::cli::{AnalysisArgs, Command, FitArgs, PlotArgs, ScriptsArgs, SimulateArgs};
use crate::data::{CatalogSpec, generate_catalog};
use crate::domain::{AnalysisConfig, LinearModel, PlotConfig};
use crate::error::{AppError, EXIT_COMPUTE, EXIT_INPUT};

pub mod pipeline;

/// Entry point for the `sfr` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; a malformed one is worth knowing about.
    let dotenv = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match dotenv {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(AppError::new(EXIT_INPUT, format!("Failed to load .env: {e}"))),
    }

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Scripts(args) => handle_scripts(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    // Ignore the error if a logger is already installed (tests).
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

pub fn analysis_config_from_args(args: &AnalysisArgs) -> AnalysisConfig {
    AnalysisConfig {
        catalog_path: args.catalog.clone(),
        detection_rule: args.detection_rule,
        agn_threshold: args.agn_threshold,
        zero_intercept: args.zero_intercept,
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args.analysis);
    let run = pipeline::run_analysis(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.catalog, &run.partition, &run.fit, &config)
    );
    println!("{}", crate::report::format_residuals(&run.residuals, args.top));

    if args.plot && !args.no_plot {
        let lines: [(LinearModel, char); 2] = [(run.fit.free, '-'), (run.fit.zero, '.')];
        let plot = crate::plot::render_ascii_plot(&run.residuals, &lines, args.width, args.height);
        println!("{plot}");
        println!("legend: o detections, - free intercept, . through origin");
    }

    if let Some(path) = &args.export_fit {
        crate::io::write_fit_json(path, &run.fit, &run.partition, &config)?;
        info!("wrote fit to {}", path.display());
    }
    if let Some(path) = &args.export_classes {
        crate::io::write_classes_csv(path, &run.catalog, &run.partition, Some(&run.fit))?;
        info!("wrote classes to {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args.analysis);
    let plot_config = PlotConfig {
        out_dir: args.out_dir.clone(),
        label_points: !args.no_labels,
        draw_fits: args.draw_fits,
    };

    let inputs = pipeline::prepare_plot(&config, args.draw_fits)?;
    println!("{}", crate::report::format_partition(&inputs.catalog, &inputs.partition));

    for path in crate::plot::render_all(&inputs.catalog, &inputs.partition, inputs.fit.as_ref(), &plot_config)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_scripts(args: ScriptsArgs) -> Result<(), AppError> {
    let imaging = match &args.config {
        Some(path) => ImagingConfig::load(path)?,
        None => ImagingConfig::default(),
    };

    if args.print_config {
        let json = serde_json::to_string_pretty(&imaging)
            .map_err(|e| AppError::new(EXIT_COMPUTE, format!("Failed to serialize imaging config: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    let mut names = match &args.targets_file {
        Some(path) => read_target_list(path)?,
        None => Vec::new(),
    };
    names.extend(args.targets.iter().cloned());
    if names.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            "No targets given. Pass target names or --targets-file <FILE>.",
        ));
    }

    let targets = discover_targets(&args.root, &names)?;
    let mut generator = ScriptGenerator::new(&imaging);
    generator.run(args.mode, &targets)?;

    std::fs::create_dir_all(&args.out_dir).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create output directory '{}': {e}", args.out_dir.display()),
        )
    })?;
    let driver = generator.write_driver(&args.out_dir)?;

    for entry in generator.scripts() {
        println!("{}", entry.script.display());
    }
    println!("driver: {}", driver.display());
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = CatalogSpec {
        rows: args.rows,
        seed: args.seed,
        detect_prob: args.detect_prob,
        agn_prob: args.agn_prob,
        suppression: args.suppression,
    };
    let rows = generate_catalog(&spec)?;
    crate::io::write_catalog(&args.out, &rows)?;
    info!("wrote {} synthetic rows to {}", rows.len(), args.out.display());
    Ok(())
}
