//! nginx log analyzer - Entry Point

use clap::Parser;
use log_analyzer::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    CliOverrides, ResolvedConfig,
};
use log_analyzer::integration::{self, RunOutcome};
use log_analyzer::model::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// nginx log analyzer - per-endpoint request timing reports
#[derive(Parser, Debug)]
#[command(name = "log-analyzer")]
#[command(version)]
#[command(about = "Builds an HTML report of per-endpoint request times from the latest nginx access log")]
pub struct Args {
    /// Maximum number of log lines to examine (0 or negative means all)
    #[arg(long, allow_negative_numbers = true)]
    pub report_size: Option<i64>,

    /// Directory searched for nginx-access-ui.log-YYYYMMDD[.gz] files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Directory receiving report-YYYY.MM.DD.html files
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// HTML template containing the $table_json placeholder
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            report_size: self.report_size,
            log_dir: self.log_dir.clone(),
            report_dir: self.report_dir.clone(),
            report_template: self.template.clone(),
            log_file_path: self.log_file.clone(),
        }
    }
}

/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = load_config_with_precedence(args.config.clone())?;
    let merged = merge_config(config_file);
    let with_env = apply_env_overrides(merged);
    Ok(apply_cli_overrides(with_env, args.overrides()))
}

fn try_main(args: Args) -> Result<RunOutcome, AppError> {
    let config = resolve_config(&args)?;
    log_analyzer::logging::init(config.log_file_path.as_deref())?;

    info!(config = ?config, "Configuration loaded and resolved");

    integration::run(&config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    match try_main(args) {
        Ok(outcome) => {
            info!(outcome = ?outcome, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            // The subscriber may not be installed yet, so stderr gets it too
            error!(error = %e, "Run failed");
            eprintln!("log-analyzer: {}", e);
            ExitCode::FAILURE
        }
    }
}
