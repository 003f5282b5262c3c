//! Runtime configuration for a generation run.

use std::path::PathBuf;
use std::time::Duration;

use crate::enumerate::Filters;

/// Default number of parallel workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default cap on citation text inlined into the synthesis prompt
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Default lookup rate limit: calls per window
pub const DEFAULT_RATE_LIMIT_CALLS: usize = 2000;

/// Default lookup rate limit window
pub const DEFAULT_RATE_LIMIT_PERIOD: Duration = Duration::from_secs(60);

/// Default retry attempts per API call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default minimum backoff between retries
pub const DEFAULT_RETRY_MIN_WAIT: Duration = Duration::from_secs(4);

/// Default maximum backoff between retries
pub const DEFAULT_RETRY_MAX_WAIT: Duration = Duration::from_secs(10);

/// Lookup service endpoint and credentials. The API key is optional:
/// without one the run proceeds on model knowledge alone.
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.exa.ai".to_string(),
            api_key: None,
        }
    }
}

/// Synthesis service endpoint, credentials, and model name.
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Everything a generation run needs, assembled by the caller from
/// config file, environment, and CLI flags.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Library catalog JSON
    pub catalog_path: PathBuf,
    /// Rule-authoring instructions text file
    pub instructions_path: PathBuf,
    /// Root of the generated document tree
    pub output_dir: PathBuf,
    /// Where raw lookup responses are dumped for auditing
    pub lookup_results_dir: PathBuf,
    /// Resumable progress ledger
    pub ledger_path: PathBuf,

    pub workers: usize,
    pub chunk_size: usize,
    pub rate_limit_calls: usize,
    pub rate_limit_period: Duration,
    pub max_retries: u32,
    pub retry_min_wait: Duration,
    pub retry_max_wait: Duration,

    pub lookup: LookupSettings,
    pub synthesis: SynthesisSettings,

    /// Restrict the run to matching catalog entries
    pub filters: Filters,
    /// Process a single known-good library and stop
    pub test_mode: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("libraries.json"),
            instructions_path: PathBuf::from("mdc-instructions.txt"),
            output_dir: PathBuf::from("rules-mdc"),
            lookup_results_dir: PathBuf::from("exa-results"),
            ledger_path: PathBuf::from("mdc-progress.json"),
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            rate_limit_calls: DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period: DEFAULT_RATE_LIMIT_PERIOD,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_min_wait: DEFAULT_RETRY_MIN_WAIT,
            retry_max_wait: DEFAULT_RETRY_MAX_WAIT,
            lookup: LookupSettings::default(),
            synthesis: SynthesisSettings::default(),
            filters: Filters::default(),
            test_mode: false,
        }
    }
}
