//! # Ingress
//!
//! HTTP 接入层：接收 Consul watch 的 HTTP handler 推送，交给 [`Sentry`] 分发。
//!
//! - `type` 头携带通知类型（大小写不敏感）
//! - `X-Consul-Index` 头携带 watch index
//! - 空 body → 400，超过 `max_body_bytes` → 413，读取失败 / 解码失败 → 500，缺少 index → 502
//! - body 默认不限长度

mod error;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::any;
use axum::Router;
use bytes::Bytes;
use contracts::{EventKind, ListenAddr, Notification, RequestContext, INDEX_HEADER, TYPE_HEADER};
use dispatcher::{Outcome, Sentry};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub use error::{IngressError, IngressRejection};

/// Build the router serving `sentry.route()`
pub fn router(sentry: Arc<Sentry>) -> Router {
    let route = normalize_route(sentry.route());
    let body_limit = match sentry.max_body_bytes() {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    Router::new()
        .route(&route, any(receive))
        .layer(body_limit)
        .with_state(sentry)
}

/// Bind `sentry.address()` and serve until the process exits
pub async fn serve(sentry: Arc<Sentry>) -> Result<(), IngressError> {
    serve_with_shutdown(sentry, std::future::pending()).await
}

/// Bind `sentry.address()` and serve until `signal` resolves
pub async fn serve_with_shutdown<F>(sentry: Arc<Sentry>, signal: F) -> Result<(), IngressError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(sentry.address()).await?;
    serve_on(listener, sentry, signal).await
}

/// Bind a listener for `address`.
///
/// Accepts `":port"` for all interfaces; host names are resolved.
pub async fn bind(address: &str) -> Result<TcpListener, IngressError> {
    let addr = ListenAddr::parse(address)?;
    TcpListener::bind((addr.host.as_str(), addr.port))
        .await
        .map_err(|source| IngressError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Serve on an already bound listener until `signal` resolves
pub async fn serve_on<F>(
    listener: TcpListener,
    sentry: Arc<Sentry>,
    signal: F,
) -> Result<(), IngressError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, route = %sentry.route(), "Sentry listening");

    let app = router(sentry).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;

    info!("Sentry stopped");
    Ok(())
}

/// Notification handler
async fn receive(
    State(sentry): State<Arc<Sentry>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, IngressRejection> {
    let started = Instant::now();
    let remote_addr = connect_info.map(|ConnectInfo(addr)| addr);

    let body = body.map_err(|e| match sentry.max_body_bytes() {
        Some(limit) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(remote_addr = ?remote_addr, limit, "Notification body over limit");
            IngressRejection::BodyTooLarge { limit }
        }
        _ => {
            warn!(remote_addr = ?remote_addr, error = %e, "Failed to read notification body");
            IngressRejection::UnreadableBody(e.body_text())
        }
    })?;
    if body.is_empty() {
        debug!(remote_addr = ?remote_addr, "Empty notification body");
        return Err(IngressRejection::EmptyBody);
    }

    let context = request_context(&headers, remote_addr);
    let kind = EventKind::resolve(&context.type_token);
    let notification = Notification::new(context, body);

    let outcome = sentry.handle(&notification).map_err(|e| {
        warn!(
            kind = %e.kind(),
            index = ?notification.context.index,
            remote_addr = ?remote_addr,
            error = %e,
            "Notification rejected"
        );
        IngressRejection::from(e)
    })?;

    if let Some(kind) = kind {
        observability::record_dispatch_latency_ms(
            kind.as_str(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
    }
    if let Outcome::Delivered(report) = outcome {
        if !report.is_complete() {
            debug!(
                kind = %report.kind,
                dropped = report.dropped,
                closed = report.closed,
                "Notification not delivered to every subscriber"
            );
        }
    }
    Ok(StatusCode::OK)
}

/// Collect the request context from headers
fn request_context(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };

    RequestContext {
        type_token: header(TYPE_HEADER).unwrap_or_default().to_string(),
        remote_addr,
        index: header(INDEX_HEADER).and_then(|v| v.parse().ok()),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
    }
}

fn normalize_route(route: &str) -> String {
    if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{route}")
    }
}
