//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LOG_ANALYZER_CONFIG";
/// Environment variable overriding `log_dir`.
pub const LOG_DIR_ENV_VAR: &str = "LOG_ANALYZER_LOG_DIR";
/// Environment variable overriding `report_dir`.
pub const REPORT_DIR_ENV_VAR: &str = "LOG_ANALYZER_REPORT_DIR";

const APP_DIR_NAME: &str = "log-analyzer";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/log-analyzer/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Maximum number of log lines to examine; `<= 0` means all.
    #[serde(default)]
    pub report_size: Option<i64>,

    /// Directory searched for rotated access logs.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Directory receiving rendered reports.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,

    /// HTML template containing the `$table_json` placeholder.
    #[serde(default)]
    pub report_template: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args. This is the
/// only configuration the pipeline sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Maximum number of log lines to examine; `<= 0` means all.
    pub report_size: i64,
    /// Directory searched for rotated access logs.
    pub log_dir: PathBuf,
    /// Directory receiving rendered reports.
    pub report_dir: PathBuf,
    /// HTML report template.
    pub report_template: PathBuf,
    /// Tracing output file; `None` logs to stderr.
    pub log_file_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            report_size: -1,
            log_dir: PathBuf::from("./log"),
            report_dir: PathBuf::from("./reports"),
            report_template: PathBuf::from("./report.html"),
            log_file_path: None,
        }
    }
}

impl ResolvedConfig {
    /// Line cap for the record stream; `None` when `report_size <= 0`.
    pub fn line_limit(&self) -> Option<usize> {
        usize::try_from(self.report_size)
            .ok()
            .filter(|&limit| limit > 0)
    }
}

/// Overrides collected from command-line flags.
///
/// `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--report-size`
    pub report_size: Option<i64>,
    /// `--log-dir`
    pub log_dir: Option<PathBuf>,
    /// `--report-dir`
    pub report_dir: Option<PathBuf>,
    /// `--template`
    pub report_template: Option<PathBuf>,
    /// `--log-file`
    pub log_file_path: Option<PathBuf>,
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.as_ref();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/log-analyzer/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LOG_ANALYZER_CONFIG` environment variable
/// 3. Default path `~/.config/log-analyzer/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        report_size: config.report_size.unwrap_or(defaults.report_size),
        log_dir: config.log_dir.unwrap_or(defaults.log_dir),
        report_dir: config.report_dir.unwrap_or(defaults.report_dir),
        report_template: config.report_template.unwrap_or(defaults.report_template),
        log_file_path: config.log_file_path.or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `LOG_ANALYZER_LOG_DIR`: Override log directory
/// - `LOG_ANALYZER_REPORT_DIR`: Override report directory
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(dir) = std::env::var(LOG_DIR_ENV_VAR) {
        config.log_dir = PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var(REPORT_DIR_ENV_VAR) {
        config.report_dir = PathBuf::from(dir);
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags that were explicitly given are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(size) = cli.report_size {
        config.report_size = size;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = dir;
    }
    if let Some(dir) = cli.report_dir {
        config.report_dir = dir;
    }
    if let Some(template) = cli.report_template {
        config.report_template = template;
    }
    if let Some(path) = cli.log_file_path {
        config.log_file_path = Some(path);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
