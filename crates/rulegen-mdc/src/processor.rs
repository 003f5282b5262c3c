//! Per-item pipeline: lookup → synthesis → document emission.
//!
//! Every failure is contained at the item boundary: a lookup that keeps
//! failing degrades to "no contextual information", a synthesis that
//! keeps failing (or violates the schema) fails the item, and nothing
//! ever propagates out of [`ItemProcessor::process`].

use std::path::PathBuf;

use indicatif::ProgressBar;

use rulegen_core::{RateLimiter, RetryPolicy};

use crate::api::{LookupResult, LookupService, SynthesisService};
use crate::document;
use crate::prompt;
use crate::work::WorkItem;

/// Outcome of processing one item, consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub key: String,
    pub success: bool,
    /// True when the item was synthesized without lookup context
    pub degraded_lookup: bool,
}

/// Settings the processor needs, and nothing more.
pub struct ProcessorSettings {
    pub output_dir: PathBuf,
    pub lookup_results_dir: PathBuf,
    /// Pre-loaded rule-authoring instructions text
    pub instructions: String,
    /// Cap on citation text inlined into the prompt
    pub chunk_size: usize,
}

/// Runs the full pipeline for a single work item.
pub struct ItemProcessor<'a> {
    lookup: Option<&'a dyn LookupService>,
    synthesis: &'a dyn SynthesisService,
    lookup_limiter: &'a RateLimiter,
    lookup_retry: RetryPolicy,
    synthesis_retry: RetryPolicy,
    settings: ProcessorSettings,
}

impl<'a> ItemProcessor<'a> {
    pub fn new(
        lookup: Option<&'a dyn LookupService>,
        synthesis: &'a dyn SynthesisService,
        lookup_limiter: &'a RateLimiter,
        lookup_retry: RetryPolicy,
        synthesis_retry: RetryPolicy,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            lookup,
            synthesis,
            lookup_limiter,
            lookup_retry,
            synthesis_retry,
            settings,
        }
    }

    /// Process one item end to end. Never panics through, never errors:
    /// the outcome is the returned result plus log lines.
    pub fn process(&self, item: &WorkItem, pb: &ProgressBar) -> ProcessingResult {
        let key = item.key();
        log::info!("Processing library: {item}");

        match self.try_process(item, pb) {
            Ok(degraded_lookup) => {
                log::info!("Successfully processed {}", item.name);
                ProcessingResult {
                    key,
                    success: true,
                    degraded_lookup,
                }
            }
            Err(e) => {
                log::error!("Error processing library {}: {e:#}", item.name);
                ProcessingResult {
                    key,
                    success: false,
                    degraded_lookup: false,
                }
            }
        }
    }

    /// Returns whether the item ran without lookup context.
    fn try_process(&self, item: &WorkItem, pb: &ProgressBar) -> anyhow::Result<bool> {
        pb.set_message("searching...");
        let lookup = self.fetch_best_practices(item);
        let degraded = prompt::is_thin(&lookup);

        if let Err(e) =
            document::save_lookup_result(&self.settings.lookup_results_dir, &item.name, &lookup)
        {
            // Audit trail only; generation proceeds without it
            log::warn!("Could not save lookup result for {}: {e}", item.name);
        }

        pb.set_message("synthesizing...");
        let prompt_text = prompt::build_prompt(
            item,
            &lookup,
            &self.settings.instructions,
            self.settings.chunk_size,
        );
        let doc = self
            .synthesis_retry
            .run(&item.key(), || self.synthesis.generate_rule(&prompt_text))?;

        pb.set_message("writing...");
        let path = document::write_document(&self.settings.output_dir, item, &doc)?;
        log::info!("Created {}", path.display());
        Ok(degraded)
    }

    /// Rate-limited, retried lookup. Exhausted retries (or no client)
    /// degrade to the empty sentinel rather than failing the item.
    fn fetch_best_practices(&self, item: &WorkItem) -> LookupResult {
        let Some(lookup) = self.lookup else {
            log::debug!("Lookup client not configured, generating from model knowledge");
            return LookupResult::default();
        };

        let query = prompt::lookup_query(&item.name);
        let attempt = || {
            // Permit per attempt so the window bound holds across retries
            self.lookup_limiter.acquire();
            lookup.best_practices(&query)
        };
        match self.lookup_retry.run(&item.key(), attempt) {
            Ok(result) => result,
            Err(e) => {
                log::warn!(
                    "Lookup failed for {} ({e}), continuing without context",
                    item.name
                );
                LookupResult::default()
            }
        }
    }
}
