//! Command implementations.

mod decode;
mod info;
mod run;
mod validate;

pub use decode::run_decode;
pub use info::run_info;
pub use run::run_sentry;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SentryBlueprint;
use tracing::info;

use crate::cli::DEFAULT_CONFIG;
use crate::error::CliError;

/// Load the blueprint at `path`.
///
/// Without an explicit path, `sentry.toml` is used if present and the
/// defaults otherwise. An explicit path that does not exist is an error.
fn load_blueprint(path: Option<&Path>) -> Result<SentryBlueprint> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(CliError::config_not_found(path.display().to_string()).into());
        }
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => Path::new(DEFAULT_CONFIG),
        None => {
            info!("No configuration file, using defaults");
            return Ok(SentryBlueprint::default());
        }
    };

    info!(config = %path.display(), "Loading configuration");
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
