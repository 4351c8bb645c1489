//! 配置校验模块
//!
//! 校验规则：
//! - server.address 形如 host:port（支持 ":port" 简写，主机名在绑定时解析）
//! - server.route 以 '/' 开头
//! - server.max_body_bytes 若设置则 > 0
//! - delivery.queue_capacity > 0
//! - observability.metrics_port 非 0，且不与监听端口冲突

use contracts::{ContractError, SentryBlueprint};

/// 校验 SentryBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SentryBlueprint) -> Result<(), ContractError> {
    validate_server(blueprint)?;
    validate_delivery(blueprint)?;
    validate_observability(blueprint)?;
    Ok(())
}

/// 校验监听配置
fn validate_server(blueprint: &SentryBlueprint) -> Result<(), ContractError> {
    let server = &blueprint.server;

    server.listen_addr().map_err(|e| {
        ContractError::config_validation("server.address", format!("invalid listen address: {e}"))
    })?;

    if !server.route.starts_with('/') {
        return Err(ContractError::config_validation(
            "server.route",
            format!("route must start with '/', got '{}'", server.route),
        ));
    }

    if server.max_body_bytes == Some(0) {
        return Err(ContractError::config_validation(
            "server.max_body_bytes",
            "max_body_bytes must be > 0 (omit it for no limit)",
        ));
    }
    Ok(())
}

/// 校验投递配置
fn validate_delivery(blueprint: &SentryBlueprint) -> Result<(), ContractError> {
    if blueprint.delivery.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "delivery.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}

/// 校验可观测性配置
fn validate_observability(blueprint: &SentryBlueprint) -> Result<(), ContractError> {
    let Some(port) = blueprint.observability.metrics_port else {
        return Ok(());
    };

    if port == 0 {
        return Err(ContractError::config_validation(
            "observability.metrics_port",
            "metrics_port must be > 0",
        ));
    }

    // 地址已在 validate_server 中校验
    if let Ok(addr) = blueprint.server.listen_addr() {
        if addr.port == port {
            return Err(ContractError::config_validation(
                "observability.metrics_port",
                format!("metrics_port {port} conflicts with server.address"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ContractError>) -> String {
        match result {
            Err(ContractError::ConfigValidation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_blueprint_is_valid() {
        assert!(validate(&SentryBlueprint::default()).is_ok());
    }

    #[test]
    fn test_shorthand_address_is_valid() {
        let mut bp = SentryBlueprint::default();
        bp.server.address = ":8080".to_string();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let mut bp = SentryBlueprint::default();
        for address in ["not-an-address", "localhost:port", "::1:8080"] {
            bp.server.address = address.to_string();
            assert_eq!(field_of(validate(&bp)), "server.address", "{address}");
        }
    }

    #[test]
    fn test_hostname_address_is_valid() {
        let mut bp = SentryBlueprint::default();
        bp.server.address = "localhost:8080".to_string();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_body_limit() {
        let mut bp = SentryBlueprint::default();
        bp.server.max_body_bytes = Some(0);
        assert_eq!(field_of(validate(&bp)), "server.max_body_bytes");

        bp.server.max_body_bytes = Some(4 << 20);
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_route_must_be_absolute() {
        let mut bp = SentryBlueprint::default();
        bp.server.route = "consul".to_string();
        assert_eq!(field_of(validate(&bp)), "server.route");
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut bp = SentryBlueprint::default();
        bp.delivery.queue_capacity = 0;
        assert_eq!(field_of(validate(&bp)), "delivery.queue_capacity");
    }

    #[test]
    fn test_metrics_port_conflict() {
        let mut bp = SentryBlueprint::default();
        bp.observability.metrics_port = Some(8080);
        assert_eq!(field_of(validate(&bp)), "observability.metrics_port");

        bp.observability.metrics_port = Some(0);
        assert_eq!(field_of(validate(&bp)), "observability.metrics_port");

        bp.observability.metrics_port = Some(9000);
        assert!(validate(&bp).is_ok());
    }
}
