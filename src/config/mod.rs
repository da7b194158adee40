//! Configuration management for geoindex.
//!
//! Configuration is a TOML file with one section per concern. Every key has a default, so a
//! missing file or an empty one yields a runnable configuration pointed at a local
//! Elasticsearch.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use geoindex::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geoindex.toml")?;
//!
//! println!("Backend: {}/{}", config.backend.endpoint, config.backend.index);
//! println!("Stages: {:?}", config.indexing.pipeline_stages);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run mode
//! - [`BackendConfig`] - search backend endpoint, index and credentials
//! - [`SourceConfig`] - where records are read from
//! - [`IndexingConfig`] - workers, batch bounds, identifier fields, pipeline stages
//! - [`RetryConfig`] - submission retry policy
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! endpoint = "https://search.example.com:9200"
//! index = "spelunker"
//! username = "elastic"
//! password = "${GEOINDEX_BACKEND_PASSWORD}"
//!
//! [source]
//! mode = "repo"
//! paths = ["/usr/local/data/whosonfirst-data-admin-us"]
//!
//! [indexing]
//! include_alternates = true
//! pipeline_stages = ["spelunker-v1"]
//! ```
//!
//! `${VAR_NAME}` placeholders are substituted from the environment, and any key can be
//! overridden with a `GEOINDEX_<SECTION>_<KEY>` variable.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_default_config};
pub use schema::{
    ApplicationConfig, BackendConfig, GeoindexConfig, IndexingConfig, LoggingConfig, RetryConfig,
    SourceConfig, SourceMode,
};
pub use secret::{secret_string, SecretString, SecretValue};
