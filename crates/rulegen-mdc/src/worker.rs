//! Parallel dispatch of work items over a bounded worker pool.
//!
//! Workers claim items from a shared queue and record each outcome in
//! the ledger as it lands. A panic escaping the processor is caught at
//! the dispatch boundary and recorded as that item's failure; sibling
//! workers keep running.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};

use rulegen_core::{ProgressLedger, SharedProgress, WorkQueue, shutdown_flag};

use crate::processor::ItemProcessor;
use crate::work::WorkItem;

/// Aggregate counts from one dispatch round.
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchOutcome {
    pub completed: usize,
    pub failed: usize,
    pub degraded_lookups: usize,
}

/// Run `processor` over `items` with `workers` parallel workers,
/// marking the ledger as each result arrives.
pub fn dispatch(
    items: Vec<WorkItem>,
    processor: &ItemProcessor<'_>,
    ledger: &ProgressLedger,
    workers: usize,
    progress: &SharedProgress,
) -> DispatchOutcome {
    let queue = WorkQueue::new(items);
    if queue.total() == 0 {
        log::info!("Nothing to process");
        return DispatchOutcome::default();
    }

    log::info!(
        "Processing {} libraries with {} workers",
        queue.total(),
        workers.max(1)
    );

    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let degraded = AtomicUsize::new(0);
    let run_bar = progress.run_bar(queue.total() as u64);

    rayon::scope(|s| {
        for _ in 0..workers.max(1) {
            s.spawn(|_| {
                while let Some(item) = queue.next() {
                    if shutdown_flag().load(Ordering::Relaxed) {
                        break;
                    }
                    let key = item.key();
                    let pb = progress.item_bar(&key);

                    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                        processor.process(item, &pb)
                    }));
                    pb.finish_and_clear();

                    match outcome {
                        Ok(result) => {
                            if result.success {
                                ledger.mark_completed(&result.key);
                                completed.fetch_add(1, Ordering::Relaxed);
                            } else {
                                ledger.mark_failed(&result.key);
                                failed.fetch_add(1, Ordering::Relaxed);
                            }
                            if result.degraded_lookup {
                                degraded.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            log::error!("Worker panicked while processing {key}");
                            ledger.mark_failed(&key);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    run_bar.inc(1);
                }
            });
        }
    });

    run_bar.finish_and_clear();
    if shutdown_flag().load(Ordering::Relaxed) && queue.remaining() > 0 {
        log::warn!(
            "Shutdown requested, {} items left unprocessed",
            queue.remaining()
        );
    }
    DispatchOutcome {
        completed: completed.into_inner(),
        failed: failed.into_inner(),
        degraded_lookups: degraded.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rulegen_core::http::ApiError;
    use rulegen_core::{ProgressContext, RateLimiter, RetryPolicy};

    use crate::api::{LookupResult, LookupService, SynthesisService};
    use crate::processor::ProcessorSettings;
    use crate::schema::RuleDoc;

    struct NoLookup;

    impl LookupService for NoLookup {
        fn best_practices(&self, _query: &str) -> Result<LookupResult, ApiError> {
            Ok(LookupResult::default())
        }
    }

    /// Fails (or panics) for library names listed in `poison`.
    struct SelectiveSynthesis {
        poison: Vec<&'static str>,
        panic_on_poison: bool,
        seen: Mutex<Vec<String>>,
    }

    impl SynthesisService for SelectiveSynthesis {
        fn generate_rule(&self, prompt: &str) -> Result<RuleDoc, ApiError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            if let Some(name) = self.poison.iter().find(|n| prompt.contains(**n)) {
                if self.panic_on_poison {
                    panic!("poisoned item");
                }
                return Err(ApiError::schema(format!("bad response for {name}")));
            }
            Ok(RuleDoc {
                name: "n".into(),
                glob_pattern: "*".into(),
                description: "d".into(),
                content: "c".into(),
            })
        }
    }

    fn items(names: &[&str]) -> Vec<WorkItem> {
        names
            .iter()
            .map(|n| WorkItem::new("cat", "sub", *n))
            .collect()
    }

    fn run_dispatch(
        dir: &tempfile::TempDir,
        synthesis: &SelectiveSynthesis,
        work: Vec<WorkItem>,
    ) -> (DispatchOutcome, ProgressLedger) {
        let ledger = ProgressLedger::load(dir.path().join("progress.json"));
        let lookup = NoLookup;
        let limiter = RateLimiter::new(1000, Duration::from_secs(60));
        let retry = RetryPolicy::new(1, Duration::ZERO, Duration::ZERO);
        let processor = ItemProcessor::new(
            Some(&lookup),
            synthesis,
            &limiter,
            retry,
            retry,
            ProcessorSettings {
                output_dir: dir.path().join("out"),
                lookup_results_dir: dir.path().join("lookups"),
                instructions: "i".into(),
                chunk_size: 50_000,
            },
        );
        let progress = Arc::new(ProgressContext::new());
        let outcome = dispatch(work, &processor, &ledger, 3, &progress);
        (outcome, ledger)
    }

    #[test]
    fn all_items_processed_and_marked() {
        let dir = tempfile::tempdir().unwrap();
        let synthesis = SelectiveSynthesis {
            poison: vec![],
            panic_on_poison: false,
            seen: Mutex::new(Vec::new()),
        };
        let (outcome, ledger) = run_dispatch(&dir, &synthesis, items(&["a", "b", "c"]));
        assert_eq!(outcome.completed, 3);
        assert_eq!(outcome.failed, 0);
        assert!(ledger.is_completed("cat/sub/a"));
        assert!(ledger.is_completed("cat/sub/b"));
        assert!(ledger.is_completed("cat/sub/c"));
    }

    #[test]
    fn one_failure_does_not_disturb_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let synthesis = SelectiveSynthesis {
            poison: vec!["Name: b\n"],
            panic_on_poison: false,
            seen: Mutex::new(Vec::new()),
        };
        let (outcome, ledger) = run_dispatch(&dir, &synthesis, items(&["a", "b", "c"]));
        assert_eq!(outcome.completed, 2);
        assert_eq!(outcome.failed, 1);
        assert!(ledger.is_completed("cat/sub/a"));
        assert!(!ledger.is_completed("cat/sub/b"));
        assert!(ledger.is_completed("cat/sub/c"));
    }

    #[test]
    fn panic_recorded_as_failure_pool_survives() {
        let dir = tempfile::tempdir().unwrap();
        let synthesis = SelectiveSynthesis {
            poison: vec!["Name: b\n"],
            panic_on_poison: true,
            seen: Mutex::new(Vec::new()),
        };
        let (outcome, ledger) = run_dispatch(&dir, &synthesis, items(&["a", "b", "c"]));
        assert_eq!(outcome.completed, 2);
        assert_eq!(outcome.failed, 1);
        assert!(!ledger.is_completed("cat/sub/b"));
        // Failure is persisted for retry on the next run
        let reloaded = ProgressLedger::load(dir.path().join("progress.json"));
        assert_eq!(reloaded.len(), 3);
    }

    #[test]
    fn empty_work_list_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let synthesis = SelectiveSynthesis {
            poison: vec![],
            panic_on_poison: false,
            seen: Mutex::new(Vec::new()),
        };
        let (outcome, ledger) = run_dispatch(&dir, &synthesis, vec![]);
        assert_eq!(outcome.completed + outcome.failed, 0);
        assert!(ledger.is_empty());
    }
}
