//! Logging with indicatif integration and an optional run log file.
//!
//! Console output goes through the `MultiProgress` in TTY mode so log
//! lines never tear progress bars. When a log directory is configured,
//! every record is also appended to a timestamped file for the run.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::MultiProgress;

/// ANSI color code and padded label for a log level.
fn level_style(level: log::Level, color: bool) -> (&'static str, &'static str, &'static str) {
    let label = match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    if !color {
        return ("", label, "");
    }
    let ansi = match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    };
    (ansi, label, "\x1b[0m")
}

/// Logger routing records to stderr (through indicatif when active) and
/// optionally teeing them into a per-run log file.
struct PipelineLogger {
    inner: env_logger::Logger,
    multi: Option<MultiProgress>,
    file: Option<Mutex<File>>,
}

impl log::Log for PipelineLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        let color = self.multi.is_some();
        let (pre, label, post) = level_style(record.level(), color);
        let line = format!("[{pre}{label}{post}] {}", record.args());
        match &self.multi {
            Some(multi) => multi.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
        if let Some(file) = &self.file {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let (_, label, _) = level_style(record.level(), false);
            let mut file = file.lock().expect("log file poisoned");
            let _ = writeln!(file, "{ts} [{label}] {}", record.args());
        }
    }

    fn flush(&self) {
        self.inner.flush();
        if let Some(file) = &self.file {
            let _ = file.lock().expect("log file poisoned").flush();
        }
    }
}

/// Create the per-run log file, named after the start timestamp.
fn open_log_file(log_dir: &Path) -> std::io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = log_dir.join(format!("mdc-generation-{stamp}.log"));
    let file = File::create(&path)?;
    Ok((file, path))
}

/// Initialize logging.
///
/// `multi` enables the indicatif bridge (TTY mode); `log_dir`, when set,
/// adds the per-run log file. Level: debug > quiet > info, overridable
/// via `RUST_LOG`.
pub fn init_logging(
    quiet: bool,
    debug: bool,
    multi: Option<&MultiProgress>,
    log_dir: Option<&Path>,
) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let inner =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .build();
    let max_level = inner.filter();

    let file = log_dir.and_then(|dir| match open_log_file(dir) {
        Ok((file, path)) => {
            eprintln!("Logs will be saved to {}", path.display());
            Some(Mutex::new(file))
        }
        Err(e) => {
            eprintln!("Cannot create log file in {}: {e}", dir.display());
            None
        }
    });

    let logger = PipelineLogger {
        inner,
        multi: multi.cloned(),
        file,
    };
    log::set_boxed_logger(Box::new(logger)).expect("failed to init logger");
    log::set_max_level(max_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_named_after_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = open_log_file(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("mdc-generation-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn log_dir_created_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");
        open_log_file(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn level_labels_padded_to_five() {
        for level in [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ] {
            let (_, label, _) = level_style(level, false);
            assert_eq!(label.len(), 5);
        }
    }
}
