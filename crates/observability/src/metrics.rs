//! 通知分发指标记录
//!
//! 所有函数在未安装 recorder 时为 no-op。

use metrics::{counter, gauge, histogram};

/// 记录收到的已知类型通知
pub fn record_notification_received(kind: &str) {
    counter!(
        "sentry_notifications_received_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录未知类型通知
pub fn record_notification_unrouted() {
    counter!("sentry_notifications_unrouted_total").increment(1);
}

/// 记录被抑制的重复通知
pub fn record_duplicate(kind: &str) {
    counter!(
        "sentry_notifications_duplicate_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录解码失败
pub fn record_decode_failure(kind: &str) {
    counter!("sentry_decode_failures_total", "kind" => kind.to_string()).increment(1);
}

/// 记录一次分发的投递结果
pub fn record_delivery(kind: &str, delivered: usize, dropped: usize, closed: usize) {
    for (status, count) in [
        ("delivered", delivered),
        ("dropped", dropped),
        ("closed", closed),
    ] {
        if count > 0 {
            counter!(
                "sentry_deliveries_total",
                "kind" => kind.to_string(),
                "status" => status
            )
            .increment(count as u64);
        }
    }
}

/// 记录当前订阅者数量
pub fn record_subscriber_count(kind: &str, count: usize) {
    gauge!("sentry_subscribers", "kind" => kind.to_string()).set(count as f64);
}

/// 记录单个请求的处理耗时
pub fn record_dispatch_latency_ms(kind: &str, latency_ms: f64) {
    histogram!(
        "sentry_dispatch_latency_ms",
        "kind" => kind.to_string()
    )
    .record(latency_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_notification_received("key");
        record_notification_unrouted();
        record_duplicate("nodes");
        record_decode_failure("checks");
        record_delivery("event", 2, 1, 0);
        record_subscriber_count("service", 3);
        record_dispatch_latency_ms("services", 0.5);
    }
}
