//! External system integrations for geoindex.
//!
//! - [`source`] - where records come from (filesystem and Who's On First repositories)
//! - [`backend`] - the search backend (Elasticsearch bulk API, or a dry-run stand-in)
//!
//! Both sides are traits, so the indexing core can be driven by in-memory sources and mock
//! clients in tests.
//!
//! ```rust,no_run
//! use geoindex::adapters::backend::create_index_client;
//! use geoindex::adapters::source::{FilesystemSource, RecordSource};
//! use geoindex::config::{GeoindexConfig, SourceMode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeoindexConfig::default();
//! let client = create_index_client(&config)?;
//! let source = FilesystemSource::new(
//!     vec!["/usr/local/data/whosonfirst-data-admin-ca".into()],
//!     SourceMode::Repo,
//! );
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod source;
