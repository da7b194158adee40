//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "geoindex.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put credentials in .env (GEOINDEX_BACKEND_USERNAME, GEOINDEX_BACKEND_PASSWORD)");
                println!("  3. Validate configuration: geoindex validate-config");
                println!("  4. Run: geoindex index /path/to/whosonfirst-data-admin-xx");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# geoindex configuration

[application]
log_level = "info"

[backend]
endpoint = "http://localhost:9200"
index = "millsfield"

[source]
mode = "repo"
paths = []

[indexing]
pipeline_stages = []
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# geoindex configuration
#
# Values of the form ${VAR} are replaced with environment variables when the file is loaded.
# Every key can also be overridden with GEOINDEX_<SECTION>_<KEY>, for example
# GEOINDEX_BACKEND_INDEX=spelunker.

[application]
# trace, debug, info, warn, error
log_level = "info"

# Prepare and batch documents without submitting them
dry_run = false

[backend]
endpoint = "http://localhost:9200"
index = "millsfield"

# Basic authentication; leave unset for an open cluster
# username = "${ES_USERNAME}"
# password = "${ES_PASSWORD}"

# Per-request timeout
timeout_seconds = 60

# Create the index before indexing; an existing index is fine
create_index = true

[source]
# repo: each path is a Who's On First repository and only data/ is read
# directory: each path is walked as-is
mode = "repo"
paths = ["/usr/local/data/whosonfirst-data-admin-ca"]

[indexing]
# Concurrent record workers and in-flight bulk requests
workers = 8

# A batch is flushed at whichever bound is reached first
max_batch_count = 1000
max_batch_bytes = 5000000
flush_interval_seconds = 30

# Index alternate geometries as <id>-<label> instead of skipping them
include_alternates = false

id_field = "properties.wof:id"
alt_label_field = "properties.src:alt_label"

# Ordered transform stages:
#   extract-properties, append-name-stats, append-concordance-stats,
#   append-placetype-details, append-spelunker-v1, spelunker-v1
# extract-properties cannot be combined with the append-* stages, and
# spelunker-v1 stands alone.
pipeline_stages = ["spelunker-v1"]

[retry]
# Total attempts per batch, including the first
max_attempts = 5
base_delay_ms = 500
max_delay_ms = 30000

# HTTP statuses retried in addition to connection errors and timeouts
retry_on_status = [429, 502, 503, 504]

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
