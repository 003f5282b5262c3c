//! Rulegen Core - Pipeline infrastructure for batch document generation
//!
//! This crate provides the reusable pieces of the generation pipeline:
//! the progress ledger, rate limiting, retry policies, work distribution,
//! progress reporting, and shared HTTP plumbing.

pub mod http;
pub mod ledger;
pub mod logging;
pub mod progress;
pub mod queue;
pub mod rate_limit;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use http::{ApiError, SHARED_RUNTIME, http_client};
pub use ledger::{ItemStatus, ProgressLedger};
pub use logging::init_logging;
pub use progress::{ProgressContext, SharedProgress};
pub use queue::WorkQueue;
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use shutdown::{is_shutdown_requested, shutdown_flag};
