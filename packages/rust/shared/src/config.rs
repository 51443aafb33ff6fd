//! Application configuration for SalesIntel.
//!
//! User config lives at `~/.salesintel/salesintel.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesIntelError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "salesintel.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".salesintel";

// ---------------------------------------------------------------------------
// Config structs (matching salesintel.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Gemini text generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Per-stage tuning.
    #[serde(default)]
    pub stages: StagesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the result store file.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Directory where report JSON files are written.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Reuse cached reports unless `--no-cache` is given.
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            reports_dir: default_reports_dir(),
            use_cache: true,
        }
    }
}

fn default_store_path() -> String {
    "memory_bank.json".into()
}
fn default_reports_dir() -> String {
    "reports".into()
}
fn default_true() -> bool {
    true
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for analysis and outreach.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash-exp".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[stages]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesConfig {
    /// Headlines gathered by the research stage.
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,

    /// Contacts that receive a drafted email.
    #[serde(default = "default_max_outreach_emails")]
    pub max_outreach_emails: usize,

    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,

    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,

    #[serde(default = "default_outreach_temperature")]
    pub outreach_temperature: f32,

    #[serde(default = "default_outreach_max_tokens")]
    pub outreach_max_tokens: u32,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            news_limit: default_news_limit(),
            max_outreach_emails: default_max_outreach_emails(),
            analysis_temperature: default_analysis_temperature(),
            analysis_max_tokens: default_analysis_max_tokens(),
            outreach_temperature: default_outreach_temperature(),
            outreach_max_tokens: default_outreach_max_tokens(),
        }
    }
}

fn default_news_limit() -> usize {
    5
}
fn default_max_outreach_emails() -> usize {
    3
}
fn default_analysis_temperature() -> f32 {
    0.7
}
fn default_analysis_max_tokens() -> u32 {
    2000
}
fn default_outreach_temperature() -> f32 {
    0.8
}
fn default_outreach_max_tokens() -> u32 {
    800
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.salesintel/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SalesIntelError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.salesintel/salesintel.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SalesIntelError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SalesIntelError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SalesIntelError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SalesIntelError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SalesIntelError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Gemini API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(SalesIntelError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable,\n\
             or run with --offline to use canned analysis and outreach."
        ))),
    }
}
