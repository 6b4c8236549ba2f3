//! 规则库访问层
//!
//! 促销判定所需的三类只读查询。连接管理、超时与重试属于
//! 实现方的职责，核心流水线只通过本接口读取规则。

use crate::error::Result;
use crate::models::{ConditionRecord, ParentRule};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub mod pg;

pub use pg::PgRuleStore;

/// 规则库读取接口
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// 按"条件名 = 值"等值匹配查询子条件
    ///
    /// 只命中操作符为 `=` 的记录，用于流水线第一步的候选收集。
    async fn child_conditions_matching(
        &self,
        condition_name: &str,
        value: &str,
    ) -> Result<Vec<ConditionRecord>>;

    /// 查询某个 SourceRecordId 下的完整子条件集合
    async fn child_conditions_by_source(
        &self,
        source_record_id: &str,
    ) -> Result<Vec<ConditionRecord>>;

    /// 批量查询父规则
    async fn parent_rules(&self, source_record_ids: &[String]) -> Result<Vec<ParentRule>>;
}
