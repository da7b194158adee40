// Geoindex - Who's On First GeoJSON to Elasticsearch indexer
// Copyright (c) 2025 Geoindex Contributors
// Licensed under the MIT License

//! # geoindex - Who's On First GeoJSON to Elasticsearch
//!
//! geoindex reads Who's On First GeoJSON feature files, reshapes them through a configurable
//! transform pipeline and bulk-indexes them into Elasticsearch.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** `*.geojson` records from repositories or plain directories
//! - **Resolving** document ids, including the alternate geometry policy
//! - **Transforming** documents with named stages (properties extraction, name and
//!   concordance statistics, placetype details)
//! - **Loading** documents through the `_bulk` API in bounded, retried batches
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (identifier resolution, transforms, batching, submission)
//! - [`adapters`] - External integrations (filesystem sources, Elasticsearch)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geoindex::adapters::backend::create_index_client;
//! use geoindex::adapters::source::FilesystemSource;
//! use geoindex::config::load_config;
//! use geoindex::core::index::IndexCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("geoindex.toml")?;
//!     let client = create_index_client(&config)?;
//!     let source = FilesystemSource::new(
//!         config.source.paths.iter().map(Into::into).collect(),
//!         config.source.mode,
//!     );
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let report = IndexCoordinator::new(config, client, shutdown_rx)?
//!         .run(&source)
//!         .await?;
//!
//!     println!("Indexed {} documents", report.indexed);
//!     Ok(())
//! }
//! ```
//!
//! ## Transform Pipeline
//!
//! Stages are chosen by name and validated together before any record is read:
//!
//! ```rust
//! use geoindex::core::transform::Pipeline;
//!
//! assert!(Pipeline::from_names(&["append-name-stats", "append-placetype-details"]).is_ok());
//! assert!(Pipeline::from_names(&["extract-properties", "append-name-stats"]).is_err());
//! ```
//!
//! ## Error Handling
//!
//! Run-level failures use [`domain::IndexerError`]. Problems with a single record are
//! [`domain::DocumentError`]s; they are counted in the run report and never stop a run.
//!
//! ## Logging
//!
//! geoindex logs with the `tracing` crate; see [`logging::init_logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
