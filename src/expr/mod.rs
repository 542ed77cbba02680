//! Test expressions for the conditional directive
//!
//! A deliberately small language: literals, variable paths, comparisons and
//! boolean connectives. Template content never reaches a general-purpose
//! evaluator.
//!
//! ```text
//! expr       := or
//! or         := and ( ("||" | "or") and )*
//! and        := not ( ("&&" | "and") not )*
//! not        := ("!" | "not") not | comparison
//! comparison := atom ( op atom )?
//! op         := "=" | "==" | "===" | "!=" | "!==" | "<" | "<=" | ">" | ">="
//! atom       := number | string | "true" | "false" | "null" | path | "(" expr ")"
//! path       := ident ( "." ident )*
//! ```

pub mod ast;
mod eval;
mod grammar;
pub mod lexer;

pub use ast::{CompareOp, Expr, Literal};
pub use eval::evaluate;
pub use grammar::parse;
pub use lexer::Span;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while lexing, parsing or evaluating an expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    /// Unexpected character or token
    #[error("syntax error at {span:?}: {message}")]
    Syntax { span: Span, message: String },

    /// Ordering between values that have no common order
    #[error("cannot compare {left} {op} {right}")]
    Incomparable {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// Logical operator applied to a non-boolean
    #[error("'{op}' expects boolean operands, found {found}")]
    NotBoolean {
        op: &'static str,
        found: &'static str,
    },
}

impl ExprError {
    /// Location in the expression text, for syntax errors
    pub fn span(&self) -> Option<Span> {
        match self {
            ExprError::Syntax { span, .. } => Some(span.clone()),
            _ => None,
        }
    }
}

/// Parse and evaluate a test, returning whether it is the boolean `true`
///
/// Any other result, such as a number or a string, counts as false.
pub fn is_true(source: &str, variables: &Value) -> Result<bool, ExprError> {
    let expr = parse(source)?;
    Ok(matches!(evaluate(&expr, variables)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_true_strict() {
        assert_eq!(is_true("1 = 1", &json!({})), Ok(true));
        assert_eq!(is_true("'yes'", &json!({})), Ok(false));
        assert_eq!(is_true("flag", &json!({"flag": true})), Ok(true));
    }

    #[test]
    fn test_is_true_reports_syntax_span() {
        let err = is_true("a = = b", &json!({})).unwrap_err();
        assert!(matches!(err, ExprError::Syntax { .. }));
        assert!(err.span().is_some());
    }
}
