//! 日志初始化模块
//!
//! 基于 tracing-subscriber 的统一日志配置：EnvFilter 过滤 +
//! fmt 输出层，支持 JSON（结构化）与 pretty（人类可读）两种格式。

use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 初始化日志
///
/// RUST_LOG 优先，其次取配置中的 log_level。重复初始化返回错误，
/// 测试中可忽略。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_enough_for_tests() {
        let config = ObservabilityConfig::default();
        // 首次初始化成功，重复初始化报错但不 panic
        let first = init(&config);
        let second = init(&config);
        assert!(first.is_ok() || second.is_err());
    }
}
