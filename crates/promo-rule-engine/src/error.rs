//! 促销规则引擎错误类型

use thiserror::Error;

/// 引擎错误
///
/// 只有 `Store` 会中止整个 `apply_promo` 调用，其余错误
/// 按记录或按父规则降级处理（记录 warning 后继续）。
#[derive(Debug, Error)]
pub enum PromoError {
    #[error("规则库访问失败: {0}")]
    Store(#[from] sqlx::Error),

    #[error("记录缺少必需字段: {entity}.{field}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("不支持的操作符: '{0}'")]
    UnsupportedOperator(String),

    #[error("不支持的数据类型: '{0}'")]
    UnsupportedDataType(String),

    #[error("表达式格式错误: {0}")]
    MalformedExpression(String),
}

pub type Result<T> = std::result::Result<T, PromoError>;
