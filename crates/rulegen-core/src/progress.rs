//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif spinner per in-flight item (cleared on
//! completion) plus an overall counter bar. Non-TTY mode: log lines only.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Spinner shown while a single item moves through lookup → synthesis → write
fn item_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:<32.dim} {wide_msg:.dim}")
        .expect("invalid template")
}

/// Overall run counter (items finished / total)
fn counter_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<10.cyan.bold} {bar:30.green/dim} {pos}/{len} {wide_msg}")
        .expect("invalid template")
        .progress_chars("--")
}

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Per-item spinner labelled with the work key.
    ///
    /// Update with `set_message` as the item advances; finish-and-clear
    /// when the item completes. Hidden (no-op) off-TTY.
    pub fn item_bar(&self, key: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(item_style());
        // Truncate long keys to keep spinners aligned
        pb.set_prefix(truncate_prefix(key, 32).to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Overall run counter over `total` items.
    pub fn run_bar(&self, total: u64) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(counter_style());
        pb.set_prefix("items");
        pb
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_prefix(key: &str, max_chars: usize) -> &str {
    match key.char_indices().nth(max_chars) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;
