//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG: &str = "sentry.toml";

/// Consul Sentry - fan-out dispatcher for Consul watch HTTP handler notifications
#[derive(Parser, Debug)]
#[command(
    name = "consul-sentry",
    author,
    version,
    about = "Consul watch notification dispatcher",
    long_about = "Receives Consul watch notifications pushed by the HTTP handler,\n\
                  decodes them by their `type` header and fans them out to the\n\
                  registered callbacks and subscriber channels."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CONSUL_SENTRY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CONSUL_SENTRY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen for watch notifications and dispatch them
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display supported watch types and effective configuration
    Info(InfoArgs),

    /// Decode a notification body offline and print it as JSON
    Decode(DecodeArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply if omitted
    /// and `sentry.toml` does not exist
    #[arg(short, long, env = "CONSUL_SENTRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override listen address (e.g., "0.0.0.0:8080", "localhost:8080" or ":8080")
    #[arg(long, env = "CONSUL_SENTRY_ADDRESS")]
    pub address: Option<String>,

    /// Override route the watch handler posts to
    #[arg(long, env = "CONSUL_SENTRY_ROUTE")]
    pub route: Option<String>,

    /// Cap request bodies at this many bytes (unlimited by default)
    #[arg(long, env = "CONSUL_SENTRY_MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Override per-subscriber queue capacity
    #[arg(long, env = "CONSUL_SENTRY_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Drop notifications that repeat the last X-Consul-Index of their type
    #[arg(long, env = "CONSUL_SENTRY_SUPPRESS_DUPLICATES")]
    pub suppress_duplicates: bool,

    /// Prometheus metrics port
    #[arg(long, env = "CONSUL_SENTRY_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = DEFAULT_CONFIG, env = "CONSUL_SENTRY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults apply if omitted and
    /// `sentry.toml` does not exist
    #[arg(short, long, env = "CONSUL_SENTRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `decode` command
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Watch type token (key, keyprefix, services, nodes, service, checks, event)
    #[arg(short = 't', long = "type")]
    pub watch_type: String,

    /// File holding the notification body (stdin if omitted)
    pub input: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
