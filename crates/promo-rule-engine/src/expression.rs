//! 表达式构建器
//!
//! 把父规则表达式中的子条件 RowId 替换为各自的求值结果，
//! 并对顶层括号数量做补齐，输出以单空格连接的规范化 token 流。

use std::collections::HashMap;

/// 表达式构建器
pub struct ExpressionBuilder;

impl ExpressionBuilder {
    /// 规范化父规则表达式
    ///
    /// 按空白切分 token：
    /// - RowId 命中求值结果 → 替换为 "true"/"false"
    /// - 逻辑操作符、括号与布尔字面量原样保留
    /// - 其余 token（没有求值结果的 RowId）替换为 "false"，
    ///   保留原始标识符会让后续求值必然失败
    ///
    /// 随后统计左右括号数量：左多右少在末尾补 ')'，右多左少在
    /// 开头补 '('。这只是顶层数量修复，内部错位的括号不在此修复，
    /// 由求值器报 `MalformedExpression`。
    pub fn build(expression: &str, results: &HashMap<String, bool>) -> String {
        let mut tokens: Vec<&str> = Vec::new();

        for token in expression.split_whitespace() {
            let substituted = match results.get(token) {
                Some(true) => "true",
                Some(false) => "false",
                None => match token {
                    "AND" | "OR" | "(" | ")" | "true" | "false" => token,
                    _ => "false",
                },
            };
            tokens.push(substituted);
        }

        let opens = tokens.iter().filter(|t| **t == "(").count();
        let closes = tokens.iter().filter(|t| **t == ")").count();

        if opens > closes {
            for _ in 0..(opens - closes) {
                tokens.push(")");
            }
        } else if closes > opens {
            for _ in 0..(closes - opens) {
                tokens.insert(0, "(");
            }
        }

        tokens.join(" ")
    }
}
