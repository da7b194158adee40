//! Configuration schema types
//!
//! This module defines the configuration structure for geoindex. Every section has defaults,
//! so an empty TOML file is a valid configuration.

use crate::config::SecretString;
use crate::core::transform::Pipeline;
use crate::domain::FieldPath;
use serde::{Deserialize, Serialize};

/// Main geoindex configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoindexConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Search backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Where records are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Batching, identifier and pipeline settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Submission retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GeoindexConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid, including an incompatible
    /// pipeline stage selection.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.backend.validate()?;
        self.source.validate()?;
        self.indexing.validate()?;
        self.retry.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (prepare documents but submit nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Search backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Fully-qualified Elasticsearch endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Index documents are written to
    #[serde(default = "default_index")]
    pub index: String,

    /// Username for basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Create the index before indexing starts
    #[serde(default = "default_true")]
    pub create_index: bool,
}

impl BackendConfig {
    fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("backend.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("backend.endpoint must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.endpoint)
            .map_err(|e| format!("backend.endpoint is not a valid URL: {e}"))?;

        if self.index.is_empty() {
            return Err("backend.index cannot be empty".to_string());
        }

        if self.index.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
            return Err(format!(
                "backend.index '{}' must be lowercase and contain no whitespace",
                self.index
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(
                "backend.username and backend.password must be set together".to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("backend.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            index: default_index(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            create_index: true,
        }
    }
}

/// How source paths are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Each path is a Who's On First repository; features live under `data/`
    #[default]
    Repo,
    /// Each path is walked as-is
    Directory,
}

/// Record source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source mode
    #[serde(default)]
    pub mode: SourceMode,

    /// Paths to read from; may be supplied on the command line instead
    #[serde(default)]
    pub paths: Vec<String>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.paths.iter().any(|p| p.trim().is_empty()) {
            return Err("source.paths cannot contain empty entries".to_string());
        }
        Ok(())
    }
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Number of concurrent workers (record preparation and in-flight submissions)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Flush a batch once it holds this many documents
    #[serde(default = "default_max_batch_count")]
    pub max_batch_count: usize,

    /// Flush a batch once its bodies reach this many bytes
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Flush a batch once this long has passed since the last flush
    #[serde(default = "default_flush_interval_seconds")]
    pub flush_interval_seconds: u64,

    /// Index alternate geometry records
    #[serde(default)]
    pub include_alternates: bool,

    /// Path of the numeric feature id
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Path of the alternate geometry label
    #[serde(default = "default_alt_label_field")]
    pub alt_label_field: String,

    /// Ordered transform stage names
    #[serde(default)]
    pub pipeline_stages: Vec<String>,
}

impl IndexingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.workers == 0 || self.workers > 256 {
            return Err(format!(
                "indexing.workers must be between 1 and 256, got {}",
                self.workers
            ));
        }

        if self.max_batch_count == 0 {
            return Err("indexing.max_batch_count must be > 0".to_string());
        }

        if self.max_batch_bytes == 0 {
            return Err("indexing.max_batch_bytes must be > 0".to_string());
        }

        if self.flush_interval_seconds == 0 {
            return Err("indexing.flush_interval_seconds must be > 0".to_string());
        }

        FieldPath::parse(&self.id_field).map_err(|e| format!("indexing.id_field: {e}"))?;
        FieldPath::parse(&self.alt_label_field)
            .map_err(|e| format!("indexing.alt_label_field: {e}"))?;

        Pipeline::from_names(&self.pipeline_stages)
            .map_err(|e| format!("indexing.pipeline_stages: {e}"))?;

        Ok(())
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_batch_count: default_max_batch_count(),
            max_batch_bytes: default_max_batch_bytes(),
            flush_interval_seconds: default_flush_interval_seconds(),
            include_alternates: false,
            id_field: default_id_field(),
            alt_label_field: default_alt_label_field(),
            pipeline_stages: vec![],
        }
    }
}

/// Retry configuration for batch submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts per batch, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// HTTP statuses treated as transient
    #[serde(default = "default_retry_on_status")]
    pub retry_on_status: Vec<u16>,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 20 {
            return Err(format!(
                "retry.max_attempts must be between 1 and 20, got {}",
                self.max_attempts
            ));
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "retry.base_delay_ms ({}) cannot exceed retry.max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ));
        }

        if let Some(status) = self
            .retry_on_status
            .iter()
            .find(|s| !(100..=599).contains(*s))
        {
            return Err(format!(
                "retry.retry_on_status contains invalid HTTP status {status}"
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            retry_on_status: default_retry_on_status(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "millsfield".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_max_batch_count() -> usize {
    1000
}

fn default_max_batch_bytes() -> usize {
    5_000_000
}

fn default_flush_interval_seconds() -> u64 {
    30
}

fn default_id_field() -> String {
    crate::domain::schema::DEFAULT_ID_FIELD.to_string()
}

fn default_alt_label_field() -> String {
    crate::domain::schema::DEFAULT_ALT_LABEL_FIELD.to_string()
}

fn default_max_attempts() -> usize {
    5
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_retry_on_status() -> Vec<u16> {
    vec![429, 502, 503, 504]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
