//! Rulegen MDC - Rule document generation pipeline
//!
//! Expands a library catalog into work items, looks up best practices via
//! a web-answer API, synthesizes a rule document per library through an
//! LLM completion call, and writes `.mdc` files to a structured tree.
//! Progress is tracked in a resumable ledger so interrupted runs pick up
//! where they left off.

pub mod api;
pub mod catalog;
pub mod config;
pub mod document;
pub mod enumerate;
pub mod processor;
pub mod prompt;
pub mod runner;
pub mod schema;
pub mod stats;
pub mod work;
pub mod worker;

// Re-exports
pub use api::{LookupResult, LookupService, SynthesisService};
pub use catalog::Catalog;
pub use config::GenerateConfig;
pub use enumerate::{Filters, enumerate};
pub use processor::{ItemProcessor, ProcessingResult};
pub use runner::run;
pub use schema::RuleDoc;
pub use work::WorkItem;
