//! BehaviorSpace outcome reporter
//!
//! Run with: cargo run -p reporter
//!
//! Examples:
//!   cargo run -p reporter -- --config report.toml
//!   cargo run -p reporter -- --input-dir runs/ --graph-dir charts/ --dry-run

use clap::Parser;
use reporter::{default_config_toml, BatchMode, ReportError, Reporter, ReporterConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the reporter
#[derive(Parser, Debug)]
#[command(name = "behaviorspace-report")]
#[command(about = "Charts win ratios and population curves from BehaviorSpace exports")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory scanned for .csv exports
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory processed exports are moved into
    #[arg(long)]
    imported_dir: Option<PathBuf>,

    /// Directory charts are written to
    #[arg(long)]
    graph_dir: Option<PathBuf>,

    /// Analyse exports without drawing charts or moving files
    #[arg(long)]
    dry_run: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Args {
    fn load_config(&self) -> Result<ReporterConfig, ReportError> {
        let mut config = match &self.config {
            Some(path) => ReporterConfig::from_file(path)?,
            None => ReporterConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.paths.input_dir = dir.clone();
        }
        if let Some(dir) = &self.imported_dir {
            config.paths.imported_dir = dir.clone();
        }
        if let Some(dir) = &self.graph_dir {
            config.paths.graph_dir = dir.clone();
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Could not load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mode = if args.dry_run {
        BatchMode::DryRun
    } else {
        BatchMode::Render
    };

    let batch = Reporter::new(config);
    match batch.run(mode) {
        Ok(summary) => {
            if mode == BatchMode::DryRun {
                for report in &summary.reports {
                    for group in &report.analysis.groups {
                        tracing::info!("{}: {}", group.graph_name, group.subtitle());
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
