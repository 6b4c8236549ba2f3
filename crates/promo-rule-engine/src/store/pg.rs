//! PostgreSQL 规则库实现
//!
//! 表结构沿用规则库的既有命名：子条件表 `child_rules`，父规则表
//! `parent_comp_matrix`（表达式列 `subject_evaluator`，父产品列
//! `parent_prodid`）。原始行的列都按可空读取，在本层完成一次性
//! 解析与校验，流水线拿到的记录保证类型合法、必填字段齐全：
//!
//! - 必填字段缺失 → 记 warning 后跳过该行，其余行继续
//! - 操作符 / 数据类型标签非法 → 返回 `UnsupportedOperator` /
//!   `UnsupportedDataType`，脏数据不允许伪装成"未匹配"

use crate::error::{PromoError, Result};
use crate::models::{ConditionRecord, ParentRule};
use crate::store::RuleStore;
use async_trait::async_trait;
use promo_shared::config::DatabaseConfig;
use promo_shared::database::Database;
use sqlx::PgPool;
use tracing::{instrument, warn};

/// PostgreSQL 规则库
#[derive(Clone)]
pub struct PgRuleStore {
    pool: PgPool,
}

impl PgRuleStore {
    /// 基于既有连接池创建
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按配置建立连接池并创建规则库
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db = Database::connect(config).await?;
        Ok(Self::new(db.pool().clone()))
    }
}

#[async_trait]
impl RuleStore for PgRuleStore {
    #[instrument(skip(self))]
    async fn child_conditions_matching(
        &self,
        condition_name: &str,
        value: &str,
    ) -> Result<Vec<ConditionRecord>> {
        let rows: Vec<ChildRuleRow> = sqlx::query_as(
            r#"SELECT row_id, source_record_id, data_type, condition, operator, value
               FROM child_rules
               WHERE condition = $1 AND operator = '=' AND value = $2"#,
        )
        .bind(condition_name)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        collect_condition_records(rows)
    }

    #[instrument(skip(self))]
    async fn child_conditions_by_source(
        &self,
        source_record_id: &str,
    ) -> Result<Vec<ConditionRecord>> {
        let rows: Vec<ChildRuleRow> = sqlx::query_as(
            r#"SELECT row_id, source_record_id, data_type, condition, operator, value
               FROM child_rules
               WHERE source_record_id = $1"#,
        )
        .bind(source_record_id)
        .fetch_all(&self.pool)
        .await?;

        collect_condition_records(rows)
    }

    #[instrument(skip(self, source_record_ids), fields(sources = source_record_ids.len()))]
    async fn parent_rules(&self, source_record_ids: &[String]) -> Result<Vec<ParentRule>> {
        // 固定排序保证两次相同调用看到相同的父规则顺序
        let rows: Vec<ParentRuleRow> = sqlx::query_as(
            r#"SELECT source_record_id, subject_evaluator, parent_prodid
               FROM parent_comp_matrix
               WHERE source_record_id = ANY($1)
               ORDER BY source_record_id"#,
        )
        .bind(source_record_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(ParentRuleRow::into_rule)
            .collect())
    }
}

/// 子条件原始行，列均可空
#[derive(Debug, sqlx::FromRow)]
struct ChildRuleRow {
    row_id: Option<String>,
    source_record_id: Option<String>,
    data_type: Option<String>,
    condition: Option<String>,
    operator: Option<String>,
    value: Option<String>,
}

impl ChildRuleRow {
    /// 原始行 → 类型化记录
    fn into_record(self) -> Result<ConditionRecord> {
        Ok(ConditionRecord {
            row_id: self.row_id.ok_or(missing("child_rules", "row_id"))?,
            source_record_id: self
                .source_record_id
                .ok_or(missing("child_rules", "source_record_id"))?,
            data_type: self
                .data_type
                .ok_or(missing("child_rules", "data_type"))?
                .parse()?,
            condition: self.condition.ok_or(missing("child_rules", "condition"))?,
            operator: self
                .operator
                .ok_or(missing("child_rules", "operator"))?
                .parse()?,
            value: self.value.ok_or(missing("child_rules", "value"))?,
        })
    }
}

/// 父规则原始行
#[derive(Debug, sqlx::FromRow)]
struct ParentRuleRow {
    source_record_id: Option<String>,
    subject_evaluator: Option<String>,
    parent_prodid: Option<String>,
}

impl ParentRuleRow {
    /// SourceRecordId 或表达式缺失的父规则记 warning 后丢弃
    fn into_rule(self) -> Option<ParentRule> {
        match (self.source_record_id, self.subject_evaluator) {
            (Some(source_record_id), Some(subject_expression)) => Some(ParentRule {
                source_record_id,
                subject_expression,
                parent_product_id: self.parent_prodid,
            }),
            (source_record_id, _) => {
                warn!(
                    source_record_id = source_record_id.as_deref().unwrap_or("<null>"),
                    "父规则记录不完整，跳过"
                );
                None
            }
        }
    }
}

fn missing(entity: &'static str, field: &'static str) -> PromoError {
    PromoError::MissingField { entity, field }
}

/// 批量转换子条件行：字段缺失的行跳过，非法标签直接报错
fn collect_condition_records(rows: Vec<ChildRuleRow>) -> Result<Vec<ConditionRecord>> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(e @ PromoError::MissingField { .. }) => {
                warn!(error = %e, "子条件记录不完整，跳过");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}
