//! `run` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{DuplicatePolicy, HealthCheck, SentryBlueprint};
use dispatcher::{Sentry, SentryBuilder};
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_sentry(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint).context("Invalid configuration")?;

    info!(
        address = %blueprint.server.address,
        route = %blueprint.server.route,
        max_body_bytes = ?blueprint.server.max_body_bytes,
        queue_capacity = blueprint.delivery.queue_capacity,
        duplicate_policy = ?blueprint.delivery.duplicate_policy,
        "Configuration loaded"
    );

    if let Some(port) = blueprint.observability.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let sentry = Arc::new(SentryBuilder::from_blueprint(blueprint).build());
    install_log_handlers(&sentry);

    info!("Starting sentry...");
    ingress::serve_with_shutdown(sentry, shutdown_signal())
        .await
        .map_err(CliError::from)?;

    info!("Consul Sentry finished");
    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut SentryBlueprint, args: &RunArgs) {
    if let Some(ref address) = args.address {
        info!(address = %address, "Overriding listen address from CLI");
        blueprint.server.address = address.clone();
    }
    if let Some(ref route) = args.route {
        info!(route = %route, "Overriding route from CLI");
        blueprint.server.route = route.clone();
    }
    if let Some(limit) = args.max_body_bytes {
        blueprint.server.max_body_bytes = Some(limit);
    }
    if let Some(capacity) = args.queue_capacity {
        blueprint.delivery.queue_capacity = capacity;
    }
    if args.suppress_duplicates {
        blueprint.delivery.duplicate_policy = DuplicatePolicy::SuppressRepeatedIndex;
    }
    if let Some(port) = args.metrics_port {
        blueprint.observability.metrics_port = Some(port);
    }
}

/// Log every notification kind, and unknown types
fn install_log_handlers(sentry: &Sentry) {
    sentry.set_key_func(|kv| match kv {
        Some(kv) => info!(
            key = %kv.key,
            modify_index = kv.modify_index,
            value_bytes = kv.value.len(),
            "Key changed"
        ),
        None => info!("Key deleted"),
    });
    sentry.set_key_prefix_func(|kvs| {
        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();
        info!(count = kvs.len(), keys = ?keys, "Key prefix changed");
    });
    sentry.set_services_func(|catalog| {
        let mut names: Vec<&String> = catalog.keys().collect();
        names.sort();
        info!(count = catalog.len(), services = ?names, "Services changed");
    });
    sentry.set_nodes_func(|nodes| {
        let names: Vec<&str> = nodes.iter().map(|n| n.node.as_str()).collect();
        info!(count = nodes.len(), nodes = ?names, "Nodes changed");
    });
    sentry.set_service_func(|entries| {
        let passing = entries
            .iter()
            .filter(|e| e.checks.iter().all(is_passing))
            .count();
        info!(instances = entries.len(), passing, "Service changed");
    });
    sentry.set_checks_func(|checks| {
        let failing: Vec<&str> = checks
            .iter()
            .filter(|c| !is_passing(c))
            .map(|c| c.check_id.as_str())
            .collect();
        info!(count = checks.len(), failing = ?failing, "Checks changed");
    });
    sentry.set_event_func(|events| {
        for event in events {
            info!(
                id = %event.id,
                name = %event.name,
                l_time = event.l_time,
                payload_bytes = event.payload.len(),
                "User event"
            );
        }
    });
    sentry.set_error_func(|ctx| {
        warn!(
            token = %ctx.type_token,
            remote_addr = ?ctx.remote_addr,
            index = ?ctx.index,
            "Unknown watch type"
        );
    });
}

fn is_passing(check: &HealthCheck) -> bool {
    check.status == "passing"
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, stopping sentry...");
}
