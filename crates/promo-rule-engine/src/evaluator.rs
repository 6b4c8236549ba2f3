//! 布尔表达式求值器
//!
//! 对规范化后的 token 流做递归下降求值。文法有两级优先级，
//! AND 比 OR 绑定更紧，二者均左结合，括号可任意嵌套：
//!
//! ```text
//! expr   := term ( "OR" term )*
//! term   := factor ( "AND" factor )*
//! factor := "true" | "false" | "(" expr ")"
//! ```
//!
//! 不支持 NOT 及 AND/OR 以外的操作符，词表之外的 token、
//! 多余的尾部 token、未闭合的括号和空输入都是解析错误。

use crate::error::{PromoError, Result};

/// 括号嵌套深度上限，防止畸形输入把递归打穿栈
const MAX_NESTING_DEPTH: usize = 64;

/// 表达式求值器
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// 求值规范化表达式
    ///
    /// 输入应当是 [`ExpressionBuilder`](crate::expression::ExpressionBuilder)
    /// 产出的以空格分隔的 token 流。
    pub fn evaluate(normalized: &str) -> Result<bool> {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };

        let value = parser.expr()?;

        if parser.pos != tokens.len() {
            return Err(PromoError::MalformedExpression(format!(
                "表达式存在多余的 token: '{}'",
                tokens[parser.pos]
            )));
        }

        Ok(value)
    }
}

struct Parser<'a> {
    tokens: &'a [&'a str],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// expr := term ( "OR" term )*
    fn expr(&mut self) -> Result<bool> {
        let mut value = self.term()?;

        while self.peek() == Some("OR") {
            self.pos += 1;
            // 操作数没有副作用，短路在这里只是省掉布尔运算，
            // 右侧仍需完整解析以保证格式校验
            let rhs = self.term()?;
            value = value || rhs;
        }

        Ok(value)
    }

    /// term := factor ( "AND" factor )*
    fn term(&mut self) -> Result<bool> {
        let mut value = self.factor()?;

        while self.peek() == Some("AND") {
            self.pos += 1;
            let rhs = self.factor()?;
            value = value && rhs;
        }

        Ok(value)
    }

    /// factor := "true" | "false" | "(" expr ")"
    fn factor(&mut self) -> Result<bool> {
        match self.next() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some("(") => {
                self.depth += 1;
                if self.depth > MAX_NESTING_DEPTH {
                    return Err(PromoError::MalformedExpression(format!(
                        "括号嵌套超过 {} 层",
                        MAX_NESTING_DEPTH
                    )));
                }
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(")") => Ok(value),
                    Some(other) => Err(PromoError::MalformedExpression(format!(
                        "期望 ')'，实际是 '{}'",
                        other
                    ))),
                    None => Err(PromoError::MalformedExpression(
                        "括号未闭合".to_string(),
                    )),
                }
            }
            Some(other) => Err(PromoError::MalformedExpression(format!(
                "意外的 token: '{}'",
                other
            ))),
            None => Err(PromoError::MalformedExpression(
                "表达式意外结束".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert!(ExpressionEvaluator::evaluate("true").unwrap());
        assert!(!ExpressionEvaluator::evaluate("false").unwrap());
    }

    #[test]
    fn test_and_or() {
        assert!(!ExpressionEvaluator::evaluate("true AND false").unwrap());
        assert!(ExpressionEvaluator::evaluate("true AND true").unwrap());
        assert!(ExpressionEvaluator::evaluate("true OR false").unwrap());
        assert!(!ExpressionEvaluator::evaluate("false OR false").unwrap());
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // false OR (true AND true) = true
        assert!(ExpressionEvaluator::evaluate("false OR true AND true").unwrap());
        // (true AND false) OR true = true
        assert!(ExpressionEvaluator::evaluate("true AND false OR true").unwrap());
        // (true AND false) OR false = false
        assert!(!ExpressionEvaluator::evaluate("true AND false OR false").unwrap());
    }

    #[test]
    fn test_parens_override_precedence() {
        assert!(ExpressionEvaluator::evaluate("( true OR false ) AND true").unwrap());
        assert!(!ExpressionEvaluator::evaluate("( true OR false ) AND false").unwrap());
        // AND 不能越过括号边界短路
        assert!(ExpressionEvaluator::evaluate("true AND ( false OR true )").unwrap());
    }

    #[test]
    fn test_nested_parens() {
        assert!(
            ExpressionEvaluator::evaluate("( ( true AND ( false OR true ) ) OR false )").unwrap()
        );
    }

    #[test]
    fn test_left_associative_chain() {
        assert!(ExpressionEvaluator::evaluate("false OR false OR true").unwrap());
        assert!(!ExpressionEvaluator::evaluate("true AND true AND false").unwrap());
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = ExpressionEvaluator::evaluate("").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_unknown_token_is_malformed() {
        let err = ExpressionEvaluator::evaluate("true AND 1-A").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));

        let err = ExpressionEvaluator::evaluate("NOT true").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_trailing_tokens_are_malformed() {
        let err = ExpressionEvaluator::evaluate("true false").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_unclosed_paren_is_malformed() {
        let err = ExpressionEvaluator::evaluate("( true AND false").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_interior_imbalance_is_malformed() {
        // 数量相等但位置错乱的括号
        let err = ExpressionEvaluator::evaluate(") true (").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_nesting_within_depth_limit_evaluates() {
        let depth = MAX_NESTING_DEPTH;
        let expression = format!("{} true {}", "( ".repeat(depth), ") ".repeat(depth));
        assert!(ExpressionEvaluator::evaluate(&expression).unwrap());
    }

    #[test]
    fn test_excessive_nesting_is_malformed() {
        // 超过上限一层即拒绝，而不是递归到栈溢出
        let depth = MAX_NESTING_DEPTH + 1;
        let expression = format!("{} true {}", "( ".repeat(depth), ") ".repeat(depth));
        let err = ExpressionEvaluator::evaluate(&expression).unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }

    #[test]
    fn test_dangling_operator_is_malformed() {
        let err = ExpressionEvaluator::evaluate("true AND").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));

        let err = ExpressionEvaluator::evaluate("OR true").unwrap_err();
        assert!(matches!(err, PromoError::MalformedExpression(_)));
    }
}
