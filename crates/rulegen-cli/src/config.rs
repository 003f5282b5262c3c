//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for rulegen
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub api: ApiConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog: PathBuf,
    pub instructions: PathBuf,
    pub output_dir: PathBuf,
    pub lookup_results_dir: PathBuf,
    pub ledger: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("libraries.json"),
            instructions: PathBuf::from("mdc-instructions.txt"),
            output_dir: PathBuf::from("rules-mdc"),
            lookup_results_dir: PathBuf::from("exa-results"),
            ledger: PathBuf::from("mdc-progress.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub lookup_base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub lookup_api_key: Option<String>,
    pub synthesis_base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub synthesis_api_key: Option<String>,
    pub model: String,
    pub rate_limit_calls: usize,
    pub rate_limit_period_secs: u64,
    pub max_retries: u32,
    pub retry_min_wait_secs: u64,
    pub retry_max_wait_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let lookup = rulegen_mdc::config::LookupSettings::default();
        let synthesis = rulegen_mdc::config::SynthesisSettings::default();
        Self {
            lookup_base_url: lookup.base_url,
            lookup_api_key: std::env::var("EXA_API_KEY").ok(),
            synthesis_base_url: synthesis.base_url,
            synthesis_api_key: std::env::var("LLM_API_KEY").ok(),
            model: synthesis.model,
            rate_limit_calls: rulegen_mdc::config::DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period_secs: rulegen_mdc::config::DEFAULT_RATE_LIMIT_PERIOD.as_secs(),
            max_retries: rulegen_mdc::config::DEFAULT_MAX_RETRIES,
            retry_min_wait_secs: rulegen_mdc::config::DEFAULT_RETRY_MIN_WAIT.as_secs(),
            retry_max_wait_secs: rulegen_mdc::config::DEFAULT_RETRY_MAX_WAIT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub workers: usize,
    pub chunk_size: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: rulegen_mdc::config::DEFAULT_WORKERS,
            chunk_size: rulegen_mdc::config::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        match std::env::var(var_name) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Config references environment variable {var_name}, which is not set");
                None
            }
        }
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./rulegen.toml (current directory)
    /// 2. ~/.config/rulegen/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("rulegen.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "rulegen") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
