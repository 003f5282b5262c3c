//! Run orchestration: load inputs, enumerate work, dispatch, summarize.

use std::process::ExitCode;
use std::time::Instant;

use rulegen_core::{
    ProgressLedger, RateLimiter, RetryPolicy, SharedProgress, is_shutdown_requested,
};

use crate::api::{AnswerApi, CompletionApi, LookupService};
use crate::catalog::Catalog;
use crate::config::GenerateConfig;
use crate::enumerate::{Filters, enumerate};
use crate::processor::{ItemProcessor, ProcessorSettings};
use crate::prompt;
use crate::stats::RunSummary;
use crate::work::WorkItem;
use crate::worker::{self, DispatchOutcome};

/// Known-good target processed by a test-mode run when no filters
/// narrow it down.
const TEST_TARGET: (&str, &str, &str) = ("frontend_frameworks", "react", "react");

/// Resolve the single item a test-mode run processes: any unset filter
/// falls back to the default target.
pub fn resolve_test_item(filters: &Filters) -> WorkItem {
    WorkItem::new(
        filters.category.as_deref().unwrap_or(TEST_TARGET.0),
        filters.subcategory.as_deref().unwrap_or(TEST_TARGET.1),
        filters.library.as_deref().unwrap_or(TEST_TARGET.2),
    )
}

/// Execute one generation run end to end.
///
/// Returns the process exit code: 0 on full success, 1 when any item
/// failed, 130 when a shutdown was requested mid-run.
pub fn run(config: &GenerateConfig, progress: SharedProgress) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let catalog = Catalog::load(&config.catalog_path)?;
    log::info!(
        "Loaded catalog: {} libraries from {}",
        catalog.len(),
        config.catalog_path.display()
    );

    let ledger = ProgressLedger::load(&config.ledger_path);
    if !ledger.is_empty() {
        log::info!(
            "Resuming: ledger has {} entries ({} completed)",
            ledger.len(),
            ledger.count(rulegen_core::ItemStatus::Completed)
        );
    }

    let lookup_client = match &config.lookup.api_key {
        Some(key) => Some(AnswerApi::new(&config.lookup.base_url, key)),
        None => {
            log::warn!("Lookup API key not set, generating from model knowledge only");
            None
        }
    };
    let Some(synthesis_key) = &config.synthesis.api_key else {
        anyhow::bail!("Synthesis API key not set");
    };
    let synthesis_client = CompletionApi::new(
        &config.synthesis.base_url,
        synthesis_key,
        &config.synthesis.model,
    );

    let instructions = prompt::load_instructions(&config.instructions_path);
    let limiter = RateLimiter::new(config.rate_limit_calls, config.rate_limit_period);
    let retry = RetryPolicy::new(
        config.max_retries,
        config.retry_min_wait,
        config.retry_max_wait,
    );
    let processor = ItemProcessor::new(
        lookup_client.as_ref().map(|c| c as &dyn LookupService),
        &synthesis_client,
        &limiter,
        retry,
        retry,
        ProcessorSettings {
            output_dir: config.output_dir.clone(),
            lookup_results_dir: config.lookup_results_dir.clone(),
            instructions,
            chunk_size: config.chunk_size,
        },
    );

    let (outcome, enumerated, skipped) = if config.test_mode {
        run_test_mode(config, &catalog, &processor, &ledger)?
    } else {
        let (items, skipped) = enumerate(&catalog, &ledger, &config.filters);
        let enumerated = items.len();
        let outcome = worker::dispatch(items, &processor, &ledger, config.workers, &progress);
        (outcome, enumerated, skipped)
    };

    let summary = RunSummary::new(enumerated, skipped, outcome, start.elapsed());
    if progress.is_tty() {
        summary.print();
    } else {
        summary.log();
    }

    if is_shutdown_requested() {
        log::warn!("Shutdown requested, run interrupted");
        return Ok(ExitCode::from(130));
    }
    if summary.failed > 0 {
        log::error!("{} libraries failed, rerun to retry them", summary.failed);
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Process exactly one known item synchronously, bypassing the pool.
fn run_test_mode(
    config: &GenerateConfig,
    catalog: &Catalog,
    processor: &ItemProcessor<'_>,
    ledger: &ProgressLedger,
) -> anyhow::Result<(DispatchOutcome, usize, usize)> {
    let item = resolve_test_item(&config.filters);
    if !catalog.contains(&item.category, &item.subcategory, &item.name) {
        anyhow::bail!("Test library {item} not found in catalog");
    }
    log::info!("Test mode: processing single library {item}");

    let result = processor.process(&item, &indicatif::ProgressBar::hidden());
    let outcome = if result.success {
        ledger.mark_completed(&result.key);
        DispatchOutcome {
            completed: 1,
            failed: 0,
            degraded_lookups: result.degraded_lookup as usize,
        }
    } else {
        ledger.mark_failed(&result.key);
        DispatchOutcome {
            completed: 0,
            failed: 1,
            degraded_lookups: 0,
        }
    };
    Ok((outcome, 1, 0))
}
