//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DuplicatePolicy, SentryBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    address: String,
    route: String,
    queue_capacity: usize,
    duplicate_policy: DuplicatePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    address: blueprint.server.address,
                    route: blueprint.server.route,
                    queue_capacity: blueprint.delivery.queue_capacity,
                    duplicate_policy: blueprint.delivery.duplicate_policy,
                    metrics_port: blueprint.observability.metrics_port,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SentryBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.delivery.queue_capacity == 1 {
        warnings.push(
            "delivery.queue_capacity is 1 - subscribers that lag by one notification lose the next"
                .to_string(),
        );
    }

    if blueprint.delivery.duplicate_policy == DuplicatePolicy::SuppressRepeatedIndex {
        warnings.push(
            "duplicate suppression requires the X-Consul-Index header on every request (502 otherwise)"
                .to_string(),
        );
    }

    if blueprint
        .server
        .listen_addr()
        .is_ok_and(|addr| addr.is_loopback())
    {
        warnings.push(format!(
            "server.address {} is loopback only - a remote Consul agent cannot reach it",
            blueprint.server.address
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Listen: {}{}", summary.address, summary.route);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Duplicate policy: {:?}", summary.duplicate_policy);
            match summary.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
