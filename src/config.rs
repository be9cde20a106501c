use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::theme::Theme;

pub const DEFAULT_API_URL: &str = "https://explorer.e.cash";
pub const DEFAULT_LOG_FILE: &str = "ecashx.log";

/// ecashx - eCash block explorer in the terminal
///
/// Browses blocks, block transactions and addresses through the explorer
/// REST API.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "ecashx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "eCash Block Explorer", long_about = None)]
pub struct CliArgs {
    /// Location to open: /blocks, /block/<hash>, /block-height/<n>,
    /// /address/<addr>, an explorer URL or an ecashx:// link
    pub location: Option<String>,

    /// Explorer API base URL
    #[arg(long, env = "ECASHX_API_URL")]
    pub api_url: Option<String>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "ECASHX_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retry attempts for rate-limited or failed requests (0-10)
    #[arg(long, env = "ECASHX_RETRIES")]
    pub retries: Option<u8>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "ECASHX_RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Color theme: nord, dos-blue, amber-crt, green-phosphor
    #[arg(long, env = "ECASHX_THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Rows per page when the URL does not say (1-200)
    #[arg(long, env = "ECASHX_ROWS")]
    pub rows: Option<u32>,

    /// Path to a TOML config file
    #[arg(long, env = "ECASHX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file (the terminal is owned by the UI while it runs)
    #[arg(long, env = "ECASHX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the location's table as HTML and exit
    #[arg(long)]
    pub html: bool,
}

/// Keys accepted in the TOML config file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u8>,
    pub render_fps: Option<u32>,
    pub theme: Option<String>,
    pub rows: Option<u32>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config file")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub timeout_ms: u64,
    pub retries: u8,
    pub render_fps: u32,
    pub theme: Theme,
    pub rows: u32,
    pub log_file: PathBuf,
    pub location: Option<String>,
    pub html: bool,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        url::Url::parse(url).with_context(|| format!("{name} is not a valid URL"))?;
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args, environment variables and the config file
/// Priority: CLI args > Environment variables > Config file > Defaults
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    let file = match &args.config {
        Some(path) => FileConfig::read(path)?,
        None => FileConfig::default(),
    };
    resolve(args, file)
}

/// Merge parsed arguments (CLI and env already folded in by clap) over the file.
pub fn resolve(args: CliArgs, file: FileConfig) -> Result<Config> {
    let api_url = args
        .api_url
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    validate_url(&api_url, "ECASHX_API_URL")?;

    let timeout_ms = args.timeout_ms.or(file.timeout_ms).unwrap_or(8000);
    let timeout_ms = validate_in_range(timeout_ms, 1000, 60000, "ECASHX_TIMEOUT_MS")?;

    let retries = args.retries.or(file.retries).unwrap_or(2);
    let retries = validate_in_range(retries, 0, 10, "ECASHX_RETRIES")?;

    let render_fps = args.render_fps.or(file.render_fps).unwrap_or(30);
    let render_fps = validate_in_range(render_fps, 1, 120, "ECASHX_RENDER_FPS")?;

    let rows = args
        .rows
        .or(file.rows)
        .unwrap_or(crate::params::DEFAULT_ROWS);
    let rows = validate_in_range(rows, 1, 200, "ECASHX_ROWS")?;

    let theme = match args.theme {
        Some(theme) => theme,
        None => match file.theme {
            Some(name) => name.parse().context("theme in config file")?,
            None => Theme::default(),
        },
    };

    Ok(Config {
        api_url,
        timeout_ms,
        retries,
        render_fps,
        theme,
        rows,
        log_file: args
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        location: args.location,
        html: args.html,
    })
}

impl Config {
    pub fn print_summary(&self) {
        log::info!("ecashx configuration:");
        log::info!("  API URL: {}", self.api_url);
        log::info!("  Timeout: {}ms", self.timeout_ms);
        log::info!("  Retries: {}", self.retries);
        log::info!("  Render FPS: {}", self.render_fps);
        log::info!("  Theme: {}", self.theme);
        log::info!("  Default rows: {}", self.rows);
    }
}
