//! Evaluation of parsed test expressions against a variable context

use std::cmp::Ordering;

use serde_json::Value;

use crate::template::lookup;

use super::ast::{CompareOp, Expr, Literal};
use super::ExprError;

/// Evaluate an expression to a JSON value
///
/// A path that names no variable evaluates to null.
pub fn evaluate(expr: &Expr, variables: &Value) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(Literal::Number(n)) => Ok(Value::from(*n)),
        Expr::Literal(Literal::String(s)) => Ok(Value::String(s.clone())),
        Expr::Literal(Literal::Bool(b)) => Ok(Value::Bool(*b)),
        Expr::Literal(Literal::Null) => Ok(Value::Null),
        Expr::Path(segments) => {
            let path = segments.join(".");
            Ok(lookup(variables, &path).cloned().unwrap_or(Value::Null))
        }
        Expr::Not(inner) => {
            let value = evaluate(inner, variables)?;
            Ok(Value::Bool(!expect_bool("!", &value)?))
        }
        Expr::And(left, right) => {
            if !expect_bool("&&", &evaluate(left, variables)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(expect_bool("&&", &evaluate(right, variables)?)?))
        }
        Expr::Or(left, right) => {
            if expect_bool("||", &evaluate(left, variables)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(expect_bool("||", &evaluate(right, variables)?)?))
        }
        Expr::Compare { op, left, right } => {
            let left = evaluate(left, variables)?;
            let right = evaluate(right, variables)?;
            compare(*op, &left, &right).map(Value::Bool)
        }
    }
}

fn expect_bool(op: &'static str, value: &Value) -> Result<bool, ExprError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(ExprError::NotBoolean {
            op,
            found: type_name(other),
        }),
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    match op {
        CompareOp::Equals => Ok(loosely_equal(left, right)),
        CompareOp::NotEquals => Ok(!loosely_equal(left, right)),
        CompareOp::Less => Ok(order(op, left, right)? == Ordering::Less),
        CompareOp::LessOrEqual => Ok(order(op, left, right)? != Ordering::Greater),
        CompareOp::Greater => Ok(order(op, left, right)? == Ordering::Greater),
        CompareOp::GreaterOrEqual => Ok(order(op, left, right)? != Ordering::Less),
    }
}

/// Numbers compare numerically, also against numeric strings
fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        _ => left == right,
    }
}

fn order(op: CompareOp, left: &Value, right: &Value) -> Result<Ordering, ExprError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (as_number(left), as_number(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    ordering.ok_or_else(|| ExprError::Incomparable {
        op: op.symbol(),
        left: type_name(left),
        right: type_name(right),
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use serde_json::json;

    fn eval(source: &str, variables: Value) -> Result<Value, ExprError> {
        evaluate(&parse(source).expect("Should parse"), &variables)
    }

    #[test]
    fn test_unknown_path_is_null() {
        assert_eq!(eval("a = 'a'", json!({})), Ok(Value::Bool(false)));
        assert_eq!(eval("a = null", json!({})), Ok(Value::Bool(true)));
        assert_eq!(eval("a = 'a'", json!({"a": "a"})), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_variable_reference() {
        let vars = json!({"user": {"role": "admin", "age": 30}});
        assert_eq!(eval("user.role == 'admin'", vars.clone()), Ok(Value::Bool(true)));
        assert_eq!(eval("user.age > 18", vars), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_number_string_coercion() {
        assert_eq!(eval("'3' = 3", json!({})), Ok(Value::Bool(true)));
        assert_eq!(eval("3 != 3.0", json!({})), Ok(Value::Bool(false)));
        assert_eq!(eval("'10' > 9", json!({})), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_string_ordering_is_lexicographic() {
        assert_eq!(eval("'apple' < 'banana'", json!({})), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_logical_short_circuit() {
        // The right side would fail on a non-boolean, but is never evaluated
        assert_eq!(eval("false && 1", json!({})), Ok(Value::Bool(false)));
        assert_eq!(eval("true || 1", json!({})), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_logical_requires_booleans() {
        assert_eq!(
            eval("1 && true", json!({})),
            Err(ExprError::NotBoolean {
                op: "&&",
                found: "number"
            })
        );
    }

    #[test]
    fn test_incomparable_types() {
        assert_eq!(
            eval("null < 1", json!({})),
            Err(ExprError::Incomparable {
                op: "<",
                left: "null",
                right: "number"
            })
        );
    }

    #[test]
    fn test_null_equality() {
        assert_eq!(eval("missing = null", json!({"missing": null})), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_plain_value_result() {
        assert_eq!(eval("count", json!({"count": 3})), Ok(json!(3)));
    }
}
