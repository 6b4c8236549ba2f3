//! 单条件匹配器
//!
//! 判断一条子条件是否被当前事实集合满足。纯函数，无副作用。

use crate::models::{Attribute, ConditionRecord, DataType, Product, ProfileAttributes};

/// 一次产品求值所使用的事实集合
///
/// 属性与画像属性对所有产品共享，产品维度逐个代入。
#[derive(Debug, Clone, Copy)]
pub struct Facts<'a> {
    pub attributes: &'a [Attribute],
    pub profile_attributes: &'a ProfileAttributes,
    pub product: &'a Product,
}

/// 条件匹配器
pub struct ConditionMatcher;

impl ConditionMatcher {
    /// 判断条件是否满足
    ///
    /// - `Attribute`：扫描属性列表，任意一条同名属性满足操作符即为真，
    ///   不要求所有同名属性都满足
    /// - `ProfileAttribute`：按键查找，键不存在为假
    /// - `Product`：仅当条件字段为字面量 "Product" 时，对当前产品的
    ///   ProductId 求值
    pub fn matches(condition: &ConditionRecord, facts: &Facts<'_>) -> bool {
        match condition.data_type {
            DataType::Attribute => facts
                .attributes
                .iter()
                .filter(|attribute| attribute.name == condition.condition)
                .any(|attribute| condition.operator.resolve(&attribute.value, &condition.value)),
            DataType::ProfileAttribute => facts
                .profile_attributes
                .get(&condition.condition)
                .is_some_and(|value| condition.operator.resolve(value, &condition.value)),
            DataType::Product => {
                condition.condition == "Product"
                    && condition
                        .operator
                        .resolve(&facts.product.product_id, &condition.value)
            }
        }
    }
}
