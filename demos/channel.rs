//! Channel Demo
//!
//! Consumes key changes from a subscriber channel on its own task.
//!
//! Run with: cargo run -p demos --bin channel

use std::sync::Arc;

use dispatcher::{KeyWatch, Sentry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;

    let mut sentry = Sentry::new();
    sentry.set_address(":8080");
    let sentry = Arc::new(sentry);

    let mut keys = sentry.key_channel();
    let keys_id = keys.id();
    let consumer = tokio::spawn(async move {
        while let Some(kv) = keys.recv().await {
            match kv.as_ref() {
                Some(kv) => tracing::info!(
                    key = %kv.key,
                    value = %String::from_utf8_lossy(&kv.value),
                    "Key received"
                ),
                None => tracing::info!("Key deleted"),
            }
        }
    });

    ingress::serve_with_shutdown(Arc::clone(&sentry), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    for (kind, id, metrics) in sentry.metrics() {
        tracing::info!(
            kind = %kind,
            subscriber_id = %id,
            delivered = metrics.delivered_count,
            dropped = metrics.dropped_count,
            "Subscriber stats"
        );
    }

    // Unsubscribing closes the channel; the consumer drains and exits
    sentry.unsubscribe::<KeyWatch>(keys_id);
    consumer.await?;
    Ok(())
}
