//! Core indexing logic for geoindex.
//!
//! # Modules
//!
//! - [`identifier`] - document id resolution and the alternate geometry policy
//! - [`transform`] - named transform stages and pipeline validation
//! - [`index`] - batching, submission, statistics and run coordination
//!
//! # Indexing Workflow
//!
//! 1. **Read**: a record source yields raw `*.geojson` records
//! 2. **Resolve**: the numeric id (and alternate label) becomes the document id
//! 3. **Transform**: the configured stages reshape or enrich the document
//! 4. **Batch**: prepared documents are grouped by count, size and time
//! 5. **Submit**: batches go to the bulk API, retrying transient failures
//! 6. **Report**: per-item outcomes are folded into a run report
//!
//! # Example
//!
//! ```rust,no_run
//! use geoindex::adapters::backend::create_index_client;
//! use geoindex::adapters::source::FilesystemSource;
//! use geoindex::config::load_config;
//! use geoindex::core::index::IndexCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geoindex.toml")?;
//! let client = create_index_client(&config)?;
//! let source = FilesystemSource::new(
//!     config.source.paths.iter().map(Into::into).collect(),
//!     config.source.mode,
//! );
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = IndexCoordinator::new(config, client, shutdown_rx)?;
//! let report = coordinator.run(&source).await?;
//!
//! println!("Indexed: {}", report.indexed);
//! println!("Failed: {}", report.failed);
//! # Ok(())
//! # }
//! ```

pub mod identifier;
pub mod index;
pub mod transform;
