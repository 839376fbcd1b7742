//! Command-line interface for test-selector
//!
//! Provides argument parsing and subcommand handling for the test-selector binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Skip stable tests based on historical selection statistics
#[derive(Parser)]
#[command(name = "test-selector")]
#[command(version)]
#[command(about = "Skip stable tests based on historical selection statistics")]
#[command(
    long_about = "test-selector downloads per-suite test statistics from object storage \
    and marks candidate tests that are historically stable as skipped."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Config file used when `--config` is not given; built-in defaults apply
/// if it does not exist
pub const DEFAULT_CONFIG_PATH: &str = "test-selector.toml";

#[derive(Subcommand)]
pub enum Command {
    /// Apply selection to a JSON list of candidate tests
    Select(SelectArgs),

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Suite the tests run in (e.g. nightly, acceptance)
    #[arg(long)]
    pub suite: String,

    /// Infrastructure provider label (e.g. gce, aws)
    #[arg(long)]
    pub cloud: String,

    /// JSON file with the candidate tests
    #[arg(long)]
    pub tests: PathBuf,

    /// Where to write the annotated candidates (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read statistics from this directory instead of object storage
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,

    /// Write Prometheus metrics in text format to this file
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Exit with an error when statistics cannot be loaded
    #[arg(long)]
    pub strict: bool,
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# test-selector Configuration
# ===========================

# ─────────────────────────────────────────────────────────────────────────────
# STORAGE
# ─────────────────────────────────────────────────────────────────────────────
#
# Statistics are read from {endpoint}/storage/v1/b/{bucket}/o/{object}, where
# object = "{object_prefix}-{suite}-{cloud}.{extension}".

[storage]
bucket = "test-selector-stats"
endpoint = "https://storage.googleapis.com"
object_prefix = "tests"
extension = "csv"

# Project billed for the read (optional)
# quota_project = "my-project"

# Environment variable holding a service account or authorized user JSON.
# When unset or empty, `auth` decides what happens.
credentials_env = "GOOGLE_EPHEMERAL_CREDENTIALS"

# Fallback when no credential JSON is supplied:
#   - "default": ambient credentials from the metadata server
#   - "anonymous": no Authorization header (emulators, public buckets)
auth = "default"
metadata_endpoint = "http://metadata.google.internal"

# Per-request timeout in seconds (1-300)
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
