//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{EventKind, SentryBlueprint};
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Sentry info for JSON output
#[derive(Serialize)]
struct SentryInfo {
    version: &'static str,
    watch_types: Vec<WatchTypeInfo>,
    config: SentryBlueprint,
}

#[derive(Serialize)]
struct WatchTypeInfo {
    token: &'static str,
    payload: &'static str,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading sentry info");

    let blueprint = load_blueprint(args.config.as_deref())?;

    if args.json {
        let info = SentryInfo {
            version: env!("CARGO_PKG_VERSION"),
            watch_types: watch_types(),
            config: blueprint,
        };
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize sentry info")?;
        println!("{}", json);
    } else {
        print_info(&blueprint);
    }

    Ok(())
}

fn watch_types() -> Vec<WatchTypeInfo> {
    EventKind::ALL
        .iter()
        .map(|&kind| WatchTypeInfo {
            token: kind.as_str(),
            payload: payload_shape(kind),
        })
        .collect()
}

/// Payload shape delivered for `kind`
fn payload_shape(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Key => "KvPair | null",
        EventKind::KeyPrefix => "[KvPair]",
        EventKind::Services => "{service: [tag]}",
        EventKind::Nodes => "[Node]",
        EventKind::Service => "[ServiceEntry]",
        EventKind::Checks => "[HealthCheck]",
        EventKind::Event => "[UserEvent]",
    }
}

fn print_info(blueprint: &SentryBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Consul Sentry                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let types = watch_types();
    println!("📨 Watch types ({})", types.len());
    for (i, t) in types.iter().enumerate() {
        let prefix = if i == types.len() - 1 { "└─" } else { "├─" };
        println!("   {} {:<10} {}", prefix, t.token, t.payload);
    }

    println!("\n🌐 Server");
    println!("   ├─ Address: {}", blueprint.server.address);
    println!("   ├─ Route: {}", blueprint.server.route);
    match blueprint.server.max_body_bytes {
        Some(limit) => println!("   └─ Max body: {} bytes", limit),
        None => println!("   └─ Max body: unlimited"),
    }

    println!("\n📤 Delivery");
    println!("   ├─ Queue capacity: {}", blueprint.delivery.queue_capacity);
    println!(
        "   └─ Duplicate policy: {:?}",
        blueprint.delivery.duplicate_policy
    );

    println!("\n📈 Observability");
    println!("   ├─ Log format: {:?}", blueprint.observability.log_format);
    match blueprint.observability.metrics_port {
        Some(port) => println!("   └─ Metrics port: {}", port),
        None => println!("   └─ Metrics: disabled"),
    }

    println!();
}
