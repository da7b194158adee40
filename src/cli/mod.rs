//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for geoindex using clap.

pub mod commands;

use crate::config::{load_config, load_default_config, GeoindexConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file read when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "geoindex.toml";

/// geoindex - Who's On First GeoJSON to Elasticsearch indexer
#[derive(Parser, Debug)]
#[command(name = "geoindex")]
#[command(version, about, long_about = None)]
#[command(author = "Geoindex Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./geoindex.toml when present)
    #[arg(short, long, env = "GEOINDEX_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GEOINDEX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index GeoJSON records into the search backend
    Index(commands::index::IndexArgs),

    /// Validate configuration file and pipeline selection
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Loads the configuration for a command
///
/// An explicit path must exist. Without one, `./geoindex.toml` is used if present, otherwise
/// defaults plus `GEOINDEX_*` environment overrides.
pub fn load_cli_config(path: Option<&str>) -> Result<GeoindexConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => load_default_config(),
    }
}
