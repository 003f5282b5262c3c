//! rulegen - Batch generator for library rule documents
//!
//! Expands a library catalog into per-library rule files, grounding
//! each one in a web best-practices lookup and an LLM synthesis call.
//! Runs are resumable: completed libraries are skipped on rerun.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::{Parser, Subcommand};

use rulegen_core::shutdown_flag;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "rulegen")]
#[command(about = "Batch generator for library rule documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./rulegen.toml or ~/.config/rulegen/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Directory for timestamped run logs
    #[arg(long, global = true, default_value = "logs")]
    log_dir: std::path::PathBuf,

    /// Disable the timestamped log file
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate rule documents from the library catalog
    Generate(cmd::generate::GenerateArgs),
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            // The logger may not be installed yet when this fires
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_signal_handler();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(rulegen_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    let log_dir = (!cli.no_log_file).then_some(cli.log_dir.as_path());
    rulegen_core::init_logging(quiet, cli.debug, multi, log_dir);

    // Load configuration
    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Generate(args) => cmd::generate::run(args, &config, &progress),
        Command::Config => {
            print_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_signal_handler() {
    // First signal: set graceful shutdown flag
    // Second signal: force exit with the conventional interrupt code
    // SAFETY: AtomicBool::store and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGTERM handler");
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGINT handler");
    }
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Catalog", &config.paths.catalog.display().to_string()]);
    table.add_row(vec![
        "Instructions",
        &config.paths.instructions.display().to_string(),
    ]);
    table.add_row(vec![
        "Output directory",
        &config.paths.output_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Lookup results",
        &config.paths.lookup_results_dir.display().to_string(),
    ]);
    table.add_row(vec!["Ledger", &config.paths.ledger.display().to_string()]);
    table.add_row(vec!["Workers", &config.processing.workers.to_string()]);
    table.add_row(vec![
        "Chunk size",
        &config.processing.chunk_size.to_string(),
    ]);
    table.add_row(vec!["Lookup API URL", &config.api.lookup_base_url]);
    table.add_row(vec![
        "Lookup API key",
        if config.api.lookup_api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec!["Synthesis API URL", &config.api.synthesis_base_url]);
    table.add_row(vec![
        "Synthesis API key",
        if config.api.synthesis_api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec!["Model", &config.api.model]);
    table.add_row(vec![
        "Rate limit",
        &format!(
            "{} calls / {}s",
            config.api.rate_limit_calls, config.api.rate_limit_period_secs
        ),
    ]);
    table.add_row(vec![
        "Retries",
        &format!(
            "{} (wait {}-{}s)",
            config.api.max_retries, config.api.retry_min_wait_secs, config.api.retry_max_wait_secs
        ),
    ]);

    eprintln!("\n{table}");
}
