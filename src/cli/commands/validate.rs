//! Validate config command implementation
//!
//! Loads the configuration, validates it and prints a summary. Validation includes the
//! pipeline stage selection, so an incompatible stage list is caught before any run.

use crate::cli::load_cli_config;
use crate::core::transform::Pipeline;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown_path = config_path.unwrap_or("(defaults and environment)");
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("Validating configuration: {shown_path}");
        println!();

        // load_cli_config validates as part of loading.
        let config = match load_cli_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let pipeline = match Pipeline::from_names(&config.indexing.pipeline_stages) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                println!("Pipeline selection is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let stages: Vec<&str> = pipeline.stages().iter().map(|s| s.name()).collect();

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Endpoint: {}", config.backend.endpoint);
        println!("  Index: {}", config.backend.index);
        println!(
            "  Authentication: {}",
            if config.backend.username.is_some() {
                "basic"
            } else {
                "none"
            }
        );
        println!("  Source Mode: {:?}", config.source.mode);
        println!("  Source Paths: {:?}", config.source.paths);
        println!("  Workers: {}", config.indexing.workers);
        println!(
            "  Batch Bounds: {} documents / {} bytes / {}s",
            config.indexing.max_batch_count,
            config.indexing.max_batch_bytes,
            config.indexing.flush_interval_seconds
        );
        println!("  Include Alternates: {}", config.indexing.include_alternates);
        if stages.is_empty() {
            println!("  Pipeline: (none)");
        } else {
            println!("  Pipeline: {}", stages.join(" -> "));
        }
        println!("  Retry Attempts: {}", config.retry.max_attempts);
        println!();

        Ok(0)
    }
}
