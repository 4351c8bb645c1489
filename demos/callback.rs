//! Callback Demo
//!
//! Logs every key change through a callback, plus unknown watch types.
//!
//! Run with: cargo run -p demos --bin callback
//! Then point a Consul watch at it:
//!
//! ```text
//! consul watch -type=key -key=foo/bar/baz -http-header type:key http://127.0.0.1:8080/
//! ```

use std::sync::Arc;

use dispatcher::Sentry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;

    let mut sentry = Sentry::new();
    sentry.set_address(":8080");

    sentry.set_key_func(|kv| match kv {
        Some(kv) => tracing::info!(
            key = %kv.key,
            value = %String::from_utf8_lossy(&kv.value),
            "Key changed"
        ),
        None => tracing::info!("Key deleted"),
    });
    sentry.set_error_func(|ctx| {
        tracing::warn!(
            token = %ctx.type_token,
            headers = ?ctx.headers,
            "Unknown watch type"
        );
    });

    ingress::serve_with_shutdown(Arc::new(sentry), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}
