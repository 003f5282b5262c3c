//! Generate subcommand - run the rule generation pipeline

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use rulegen_core::SharedProgress;
use rulegen_mdc::config::{LookupSettings, SynthesisSettings};
use rulegen_mdc::{Filters, GenerateConfig};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Process a single known library and exit (smoke test)
    #[arg(long)]
    pub test: bool,

    /// Only process this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only process this subcategory
    #[arg(long)]
    pub subcategory: Option<String>,

    /// Only process this library
    #[arg(long)]
    pub library: Option<String>,

    /// Library catalog JSON file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Rule-authoring instructions file
    #[arg(long)]
    pub instructions: Option<PathBuf>,

    /// Output directory for generated rule files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for raw lookup response dumps
    #[arg(long)]
    pub lookup_results_dir: Option<PathBuf>,

    /// Progress ledger file
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Lookup calls allowed per rate-limit window
    #[arg(long)]
    pub rate_limit: Option<usize>,
}

/// Merge CLI flags over file config into a runnable configuration.
fn build_config(args: GenerateArgs, config: &Config) -> GenerateConfig {
    GenerateConfig {
        catalog_path: args.catalog.unwrap_or_else(|| config.paths.catalog.clone()),
        instructions_path: args
            .instructions
            .unwrap_or_else(|| config.paths.instructions.clone()),
        output_dir: args
            .output
            .unwrap_or_else(|| config.paths.output_dir.clone()),
        lookup_results_dir: args
            .lookup_results_dir
            .unwrap_or_else(|| config.paths.lookup_results_dir.clone()),
        ledger_path: args.ledger.unwrap_or_else(|| config.paths.ledger.clone()),
        workers: args.workers.unwrap_or(config.processing.workers),
        chunk_size: config.processing.chunk_size,
        rate_limit_calls: args.rate_limit.unwrap_or(config.api.rate_limit_calls),
        rate_limit_period: Duration::from_secs(config.api.rate_limit_period_secs),
        max_retries: config.api.max_retries,
        retry_min_wait: Duration::from_secs(config.api.retry_min_wait_secs),
        retry_max_wait: Duration::from_secs(config.api.retry_max_wait_secs),
        lookup: LookupSettings {
            base_url: config.api.lookup_base_url.clone(),
            api_key: config.api.lookup_api_key.clone(),
        },
        synthesis: SynthesisSettings {
            base_url: config.api.synthesis_base_url.clone(),
            api_key: config.api.synthesis_api_key.clone(),
            model: config.api.model.clone(),
        },
        filters: Filters {
            category: args.category,
            subcategory: args.subcategory,
            library: args.library,
        },
        test_mode: args.test,
    }
}

pub fn run(args: GenerateArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let generate = build_config(args, config);

    log::info!("Generating rule files");
    log::info!("  Catalog: {}", generate.catalog_path.display());
    log::info!("  Output: {}", generate.output_dir.display());
    log::info!("  Workers: {}", generate.workers);
    if !generate.filters.is_empty() {
        log::info!(
            "  Filters: category={:?} subcategory={:?} library={:?}",
            generate.filters.category,
            generate.filters.subcategory,
            generate.filters.library
        );
    }

    rulegen_mdc::run(&generate, progress.clone())
}
