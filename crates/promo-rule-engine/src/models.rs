//! 促销规则引擎领域模型
//!
//! 所有实体在一次判定调用内从规则库读出后保持不可变，
//! 核心逻辑不做任何写入或持久化。

use crate::error::PromoError;
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// 订单级事实
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 账户级事实集合（键唯一）
pub type ProfileAttributes = HashMap<String, String>;

/// 候选产品行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    /// 子产品挂在父产品下时为 Some
    pub parent_prod_id: Option<String>,
    pub row_id: String,
}

impl Product {
    pub fn new(
        product_id: impl Into<String>,
        parent_prod_id: Option<&str>,
        row_id: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            parent_prod_id: parent_prod_id.map(str::to_string),
            row_id: row_id.into(),
        }
    }
}

/// 数据类型标签 —— 决定一条子条件在哪类事实上求值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Attribute,
    ProfileAttribute,
    Product,
}

impl FromStr for DataType {
    type Err = PromoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.eq_ignore_ascii_case("attribute") {
            Ok(Self::Attribute)
        } else if tag.eq_ignore_ascii_case("profile attribute") {
            Ok(Self::ProfileAttribute)
        } else if tag.eq_ignore_ascii_case("product") {
            Ok(Self::Product)
        } else {
            Err(PromoError::UnsupportedDataType(tag.to_string()))
        }
    }
}

/// 子条件记录 —— 一条可求值的谓词
///
/// 字段在存储边界完成解析与校验，核心逻辑拿到的记录
/// 保证标签合法、必填字段齐全。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// 在所属 SourceRecordId 分组内唯一
    pub row_id: String,
    pub source_record_id: String,
    pub data_type: DataType,
    /// 要匹配的字段名，Product 类条件固定为字面量 "Product"
    pub condition: String,
    pub operator: Operator,
    pub value: String,
}

/// 父规则 —— 引用子条件 RowId 的布尔表达式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRule {
    pub source_record_id: String,
    pub subject_expression: String,
    pub parent_product_id: Option<String>,
}

/// 判定输出元组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicablePromo {
    pub source_record_id: String,
    pub root_product_id: String,
    pub row_id: String,
}
