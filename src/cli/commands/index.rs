//! Index command implementation
//!
//! Reads records from the configured (or given) paths, runs them through the pipeline and
//! bulk-indexes them. The run report is printed to stdout as JSON.

use crate::adapters::backend::create_index_client;
use crate::adapters::source::FilesystemSource;
use crate::cli::load_cli_config;
use crate::config::{GeoindexConfig, SourceMode};
use crate::core::index::{IndexCoordinator, RunReport};
use crate::domain::IndexerError;
use crate::log_error_with_context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tokio::sync::watch;

const REPO_SCHEME: &str = "repo://";
const DIRECTORY_SCHEME: &str = "directory://";

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_CANCELLED: i32 = 130;

/// How source paths are interpreted
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Repo,
    Directory,
}

impl From<ModeArg> for SourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Repo => SourceMode::Repo,
            ModeArg::Directory => SourceMode::Directory,
        }
    }
}

/// Arguments for the index command
#[derive(Args, Debug, Default)]
pub struct IndexArgs {
    /// Paths to index; `repo://` and `directory://` prefixes select the mode
    pub paths: Vec<String>,

    /// Source mode for paths without a prefix
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Index alternate geometry files as well
    #[arg(long)]
    pub index_alt_files: bool,

    /// Transform stage to apply, in order (repeatable)
    #[arg(long = "stage", value_name = "NAME")]
    pub stages: Vec<String>,

    /// Number of concurrent workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Index name override
    #[arg(long)]
    pub index: Option<String>,

    /// Prepare and batch documents without submitting them
    #[arg(long)]
    pub dry_run: bool,
}

impl IndexArgs {
    /// Execute the index command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_cli_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Invalid command line arguments");
            eprintln!("{e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        if config.source.paths.is_empty() {
            eprintln!("No source paths given; pass PATHS or set source.paths");
            return Ok(EXIT_CONFIG_ERROR);
        }

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be submitted");
        }

        let client = match create_index_client(&config) {
            Ok(client) => client,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create index client");
                eprintln!("Failed to create index client: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let source = FilesystemSource::new(
            config.source.paths.iter().map(PathBuf::from).collect(),
            config.source.mode,
        );

        let coordinator = match IndexCoordinator::new(config, client, shutdown_signal) {
            Ok(coordinator) => coordinator,
            Err(e) => {
                log_error_with_context!(&e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        match coordinator.run(&source).await {
            Ok(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(exit_code(&report))
            }
            Err(e @ IndexerError::Configuration(_)) => {
                eprintln!("Configuration error: {e}");
                Ok(EXIT_CONFIG_ERROR)
            }
            Err(e) => {
                log_error_with_context!(&e, "Indexing run aborted");
                eprintln!("Indexing run aborted: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Applies command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut GeoindexConfig) -> Result<(), String> {
        if !self.paths.is_empty() {
            let (mode, paths) = split_paths(&self.paths)?;
            tracing::info!(paths = ?paths, "Using source paths from command line");
            config.source.paths = paths;
            if let Some(mode) = mode {
                config.source.mode = mode;
            }
        }

        if let Some(mode) = self.mode {
            config.source.mode = mode.into();
        }

        if self.index_alt_files {
            config.indexing.include_alternates = true;
        }

        if !self.stages.is_empty() {
            tracing::info!(stages = ?self.stages, "Using pipeline stages from command line");
            config.indexing.pipeline_stages = self.stages.clone();
        }

        if let Some(workers) = self.workers {
            config.indexing.workers = workers;
        }

        if let Some(index) = &self.index {
            config.backend.index = index.clone();
        }

        if self.dry_run {
            config.application.dry_run = true;
        }

        Ok(())
    }
}

/// Strips mode prefixes from `paths`, returning the mode they agree on
fn split_paths(paths: &[String]) -> Result<(Option<SourceMode>, Vec<String>), String> {
    let mut mode = None;
    let mut stripped = Vec::with_capacity(paths.len());

    for path in paths {
        let (path_mode, rest) = if let Some(rest) = path.strip_prefix(REPO_SCHEME) {
            (Some(SourceMode::Repo), rest)
        } else if let Some(rest) = path.strip_prefix(DIRECTORY_SCHEME) {
            (Some(SourceMode::Directory), rest)
        } else {
            (None, path.as_str())
        };

        if let Some(path_mode) = path_mode {
            match mode {
                Some(existing) if existing != path_mode => {
                    return Err(format!(
                        "Paths mix {REPO_SCHEME} and {DIRECTORY_SCHEME} prefixes"
                    ));
                }
                _ => mode = Some(path_mode),
            }
        }

        stripped.push(rest.to_string());
    }

    Ok((mode, stripped))
}

/// Maps a finished run to a process exit code
pub fn exit_code(report: &RunReport) -> i32 {
    if report.cancelled {
        EXIT_CANCELLED
    } else if report.is_successful() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL_FAILURE
    }
}
