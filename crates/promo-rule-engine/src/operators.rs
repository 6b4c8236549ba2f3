//! 条件操作符定义
//!
//! 规则库中以文本形式存储的操作符标签，在存储边界解析为
//! 带标签的枚举，之后的求值不再重新解释字符串。

use crate::error::PromoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 条件操作符
///
/// "<>" 与 "!=" 是同一个语义操作符的两种写法，统一解析为 `NotEq`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    NotEq,
    Like,
}

impl Operator {
    /// 对一对操作数求值
    ///
    /// # Arguments
    /// * `fact_value` - 事实侧的值（属性值 / 画像值 / 产品 ID）
    /// * `condition_value` - 条件记录中存储的期望值
    ///
    /// `Like` 是单向的包含判断：事实值包含条件值即为真。
    pub fn resolve(self, fact_value: &str, condition_value: &str) -> bool {
        match self {
            Self::Eq => fact_value == condition_value,
            Self::NotEq => fact_value != condition_value,
            Self::Like => fact_value.contains(condition_value),
        }
    }
}

impl FromStr for Operator {
    type Err = PromoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::NotEq),
            tag if tag.eq_ignore_ascii_case("LIKE") => Ok(Self::Like),
            other => Err(PromoError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "<>"),
            Self::Like => write!(f, "LIKE"),
        }
    }
}
