//! 促销判定流水线
//!
//! 串联规则库查询、单条件匹配、表达式构建与求值，并在最后
//! 应用父子产品关联过滤，产出适用促销元组列表。
//!
//! 一次调用内全部步骤顺序执行，除规则库查询外没有挂起点；
//! 调用之间不共享可变状态，可以并发发起。

use crate::error::{PromoError, Result};
use crate::evaluator::ExpressionEvaluator;
use crate::expression::ExpressionBuilder;
use crate::matcher::{ConditionMatcher, Facts};
use crate::models::{
    ApplicablePromo, Attribute, ConditionRecord, ParentRule, Product, ProfileAttributes,
};
use crate::store::RuleStore;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// 促销判定引擎
pub struct PromoEngine<S> {
    store: S,
}

impl<S: RuleStore> PromoEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 判定适用促销
    ///
    /// 返回的元组按"父规则顺序（规则库返回序）× 产品顺序（调用方
    /// 传入序）"排列，重复元组不去重。规则库访问失败时整个调用
    /// 中止，不返回部分结果；其余异常降级为 warning 并继续处理
    /// 剩下的规则。
    #[instrument(skip_all, fields(
        attributes = attributes.len(),
        profile_attributes = profile_attributes.len(),
        products = products.len(),
    ))]
    pub async fn apply_promo(
        &self,
        attributes: &[Attribute],
        profile_attributes: &ProfileAttributes,
        products: &[Product],
    ) -> Result<Vec<ApplicablePromo>> {
        // 1. 收集被输入事实命中的子条件
        let matching = self
            .matching_child_conditions(attributes, profile_attributes, products)
            .await?;

        // 2. 提取去重后的 SourceRecordId，保持首次出现顺序
        let mut source_ids: Vec<String> = Vec::new();
        for record in &matching {
            if !source_ids.contains(&record.source_record_id) {
                source_ids.push(record.source_record_id.clone());
            }
        }

        // 3. 没有任何命中时直接返回，不再访问规则库
        if source_ids.is_empty() {
            debug!("无命中的子条件，返回空结果");
            return Ok(Vec::new());
        }

        // 4. 取候选父规则
        let parents = self.store.parent_rules(&source_ids).await?;

        let mut promos = Vec::new();

        for parent in &parents {
            // 5./6. 取该 source 下的完整子条件集合，而非第 1 步的命中子集。
            // 规则库访问失败中止整个调用；边界解析出的脏数据只跳过这一条父规则
            let children = match self
                .store
                .child_conditions_by_source(&parent.source_record_id)
                .await
            {
                Ok(children) => children,
                Err(e @ PromoError::Store(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        source_record_id = %parent.source_record_id,
                        error = %e,
                        "子条件集合不可用，跳过该父规则"
                    );
                    continue;
                }
            };

            // 7./8. 逐产品求值并应用关联过滤
            for product in products {
                if self.rule_applies(parent, &children, attributes, profile_attributes, product)
                    && linkage_matches(parent, product)
                {
                    promos.push(ApplicablePromo {
                        source_record_id: parent.source_record_id.clone(),
                        root_product_id: product.product_id.clone(),
                        row_id: product.row_id.clone(),
                    });
                }
            }
        }

        debug!(promos = promos.len(), "促销判定完成");
        Ok(promos)
    }

    /// 第 1 步：属性、画像属性、产品三路等值查询的并集
    ///
    /// 与第 6 步一致：规则库访问失败中止整个调用，边界解析出的
    /// 脏数据只丢弃该批查询结果并记 warning。脏数据所属的规则若
    /// 经由其他事实入选，第 6 步会再次将其跳过。
    async fn matching_child_conditions(
        &self,
        attributes: &[Attribute],
        profile_attributes: &ProfileAttributes,
        products: &[Product],
    ) -> Result<Vec<ConditionRecord>> {
        let mut records = Vec::new();

        for attribute in attributes {
            self.collect_matching(&mut records, &attribute.name, &attribute.value)
                .await?;
        }

        for (name, value) in profile_attributes {
            self.collect_matching(&mut records, name, value).await?;
        }

        for product in products {
            self.collect_matching(&mut records, "Product", &product.product_id)
                .await?;
        }

        Ok(records)
    }

    /// 单路等值查询，非 Store 错误降级为 warning
    async fn collect_matching(
        &self,
        records: &mut Vec<ConditionRecord>,
        condition_name: &str,
        value: &str,
    ) -> Result<()> {
        match self
            .store
            .child_conditions_matching(condition_name, value)
            .await
        {
            Ok(batch) => records.extend(batch),
            Err(e @ PromoError::Store(_)) => return Err(e),
            Err(e) => {
                warn!(
                    condition_name,
                    error = %e,
                    "候选查询结果不可用，跳过该批记录"
                );
            }
        }

        Ok(())
    }

    /// 对单个产品求值父规则表达式
    ///
    /// 表达式无法解析时按不适用处理并记 warning，不影响其他
    /// 产品与父规则的求值。
    fn rule_applies(
        &self,
        parent: &ParentRule,
        children: &[ConditionRecord],
        attributes: &[Attribute],
        profile_attributes: &ProfileAttributes,
        product: &Product,
    ) -> bool {
        let facts = Facts {
            attributes,
            profile_attributes,
            product,
        };

        let mut results = HashMap::with_capacity(children.len());
        for child in children {
            results.insert(child.row_id.clone(), ConditionMatcher::matches(child, &facts));
        }

        let normalized = ExpressionBuilder::build(&parent.subject_expression, &results);

        match ExpressionEvaluator::evaluate(&normalized) {
            Ok(applies) => applies,
            Err(e) => {
                warn!(
                    source_record_id = %parent.source_record_id,
                    product_id = %product.product_id,
                    error = %e,
                    "表达式求值失败，按不适用处理"
                );
                false
            }
        }
    }
}

/// 父子产品关联过滤
///
/// 产品带 ParentProdId 时，父规则的 ParentProductId 必须等于它；
/// 否则必须等于产品自身的 ProductId。
fn linkage_matches(parent: &ParentRule, product: &Product) -> bool {
    match &product.parent_prod_id {
        Some(parent_prod_id) => parent.parent_product_id.as_deref() == Some(parent_prod_id.as_str()),
        None => parent.parent_product_id.as_deref() == Some(product.product_id.as_str()),
    }
}
