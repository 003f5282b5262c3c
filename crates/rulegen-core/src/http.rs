//! Shared HTTP plumbing for pipeline workers.
//!
//! Uses async reqwest internally but presents a sync surface: worker
//! threads block on the shared runtime for the two short API round-trips
//! each item needs.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout for API calls
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall request timeout (answer/completion APIs can be slow on large prompts)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Error from a single API call attempt
#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response body did not match the expected shape
    Schema(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Schema(msg) => write!(f, "schema violation: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Build an HTTP error from reqwest, stripping the URL so API
    /// endpoints (and any keys embedded in them) never reach the logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations from sync worker threads.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});
