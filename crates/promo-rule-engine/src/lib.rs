//! 促销规则引擎
//!
//! 根据订单属性、账户画像属性与候选产品列表，对规则库中的
//! 父/子两级规则做匹配与布尔表达式求值，判定每个产品适用的
//! 促销。提供：
//! - 单条件匹配（属性 / 画像属性 / 产品三类事实）
//! - 表达式构建（RowId 替换 + 顶层括号补齐）
//! - AND/OR 两级优先级的递归下降求值
//! - 含父子产品关联过滤的判定流水线

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod matcher;
pub mod models;
pub mod operators;
pub mod pipeline;
pub mod store;

pub use error::{PromoError, Result};
pub use evaluator::ExpressionEvaluator;
pub use expression::ExpressionBuilder;
pub use matcher::{ConditionMatcher, Facts};
pub use models::{
    ApplicablePromo, Attribute, ConditionRecord, DataType, ParentRule, Product, ProfileAttributes,
};
pub use operators::Operator;
pub use pipeline::PromoEngine;
pub use store::{PgRuleStore, RuleStore};
