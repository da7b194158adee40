//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{GeoindexConfig, SourceMode};
use crate::config::secret_string;
use crate::domain::errors::IndexerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`GeoindexConfig`]
/// 4. Applies environment variable overrides (`GEOINDEX_*` prefix)
/// 5. Validates the configuration, including the pipeline stage selection
///
/// # Errors
///
/// Returns [`IndexerError::Configuration`] if the file cannot be read or parsed, a referenced
/// environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use geoindex::config::loader::load_config;
///
/// let config = load_config("geoindex.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GeoindexConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IndexerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        IndexerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: GeoindexConfig = toml::from_str(&contents)
        .map_err(|e| IndexerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(&mut config)?;
    Ok(config)
}

/// Builds the default configuration, with `GEOINDEX_*` overrides applied
///
/// Used when no configuration file is given on the command line.
pub fn load_default_config() -> Result<GeoindexConfig> {
    let mut config = GeoindexConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut GeoindexConfig) -> Result<()> {
    apply_env_overrides(config)?;

    config.validate().map_err(|e| {
        IndexerError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced environment variable that is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| IndexerError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(IndexerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            IndexerError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the `GEOINDEX_*` prefix
///
/// Variables follow the pattern `GEOINDEX_<SECTION>_<KEY>`, for example
/// `GEOINDEX_BACKEND_ENDPOINT` or `GEOINDEX_INDEXING_WORKERS`. List values are
/// comma-separated.
fn apply_env_overrides(config: &mut GeoindexConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("GEOINDEX_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(dry_run) = parse_env("GEOINDEX_APPLICATION_DRY_RUN")? {
        config.application.dry_run = dry_run;
    }

    // Backend overrides
    if let Ok(val) = std::env::var("GEOINDEX_BACKEND_ENDPOINT") {
        config.backend.endpoint = val;
    }
    if let Ok(val) = std::env::var("GEOINDEX_BACKEND_INDEX") {
        config.backend.index = val;
    }
    if let Ok(val) = std::env::var("GEOINDEX_BACKEND_USERNAME") {
        config.backend.username = Some(val);
    }
    if let Ok(val) = std::env::var("GEOINDEX_BACKEND_PASSWORD") {
        config.backend.password = Some(secret_string(val));
    }
    if let Some(timeout) = parse_env("GEOINDEX_BACKEND_TIMEOUT_SECONDS")? {
        config.backend.timeout_seconds = timeout;
    }
    if let Some(create) = parse_env("GEOINDEX_BACKEND_CREATE_INDEX")? {
        config.backend.create_index = create;
    }

    // Source overrides
    if let Ok(val) = std::env::var("GEOINDEX_SOURCE_MODE") {
        config.source.mode = match val.as_str() {
            "repo" => SourceMode::Repo,
            "directory" => SourceMode::Directory,
            other => {
                return Err(IndexerError::Configuration(format!(
                    "Invalid GEOINDEX_SOURCE_MODE '{other}'. Must be one of: repo, directory"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("GEOINDEX_SOURCE_PATHS") {
        config.source.paths = split_list(&val);
    }

    // Indexing overrides
    if let Some(workers) = parse_env("GEOINDEX_INDEXING_WORKERS")? {
        config.indexing.workers = workers;
    }
    if let Some(count) = parse_env("GEOINDEX_INDEXING_MAX_BATCH_COUNT")? {
        config.indexing.max_batch_count = count;
    }
    if let Some(bytes) = parse_env("GEOINDEX_INDEXING_MAX_BATCH_BYTES")? {
        config.indexing.max_batch_bytes = bytes;
    }
    if let Some(interval) = parse_env("GEOINDEX_INDEXING_FLUSH_INTERVAL_SECONDS")? {
        config.indexing.flush_interval_seconds = interval;
    }
    if let Some(include) = parse_env("GEOINDEX_INDEXING_INCLUDE_ALTERNATES")? {
        config.indexing.include_alternates = include;
    }
    if let Ok(val) = std::env::var("GEOINDEX_INDEXING_PIPELINE_STAGES") {
        config.indexing.pipeline_stages = split_list(&val);
    }

    // Retry overrides
    if let Some(attempts) = parse_env("GEOINDEX_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = parse_env("GEOINDEX_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(delay) = parse_env("GEOINDEX_RETRY_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = delay;
    }

    // Logging overrides
    if let Some(enabled) = parse_env("GEOINDEX_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("GEOINDEX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
