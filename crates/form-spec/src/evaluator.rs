use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::condition::Condition;
use crate::context::lookup_path;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },
    #[error("operator '{operator}' cannot compare {left} with {right}")]
    TypeMismatch {
        operator: String,
        left: String,
        right: String,
    },
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Boundary to whatever interprets condition trees against a context.
pub trait ConditionEvaluator {
    fn check(&self, condition: &Condition, context: &Value) -> Result<bool, EvalError>;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&Condition, &Value) -> Result<bool, EvalError>,
{
    fn check(&self, condition: &Condition, context: &Value) -> Result<bool, EvalError> {
        self(condition, context)
    }
}

/// Evaluates an optional condition the way every call site in this crate needs it:
/// absent means always, evaluator failures mean "does not hold".
pub fn condition_holds<E>(evaluator: &E, condition: Option<&Condition>, context: &Value) -> bool
where
    E: ConditionEvaluator + ?Sized,
{
    let Some(condition) = condition else {
        return true;
    };
    match evaluator.check(condition, context) {
        Ok(result) => result,
        Err(err) => {
            debug!(%err, "condition evaluation failed; treating as false");
            false
        }
    }
}

/// Built-in evaluator for the JSON rule dialect the schema emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesEvaluator;

impl ConditionEvaluator for RulesEvaluator {
    fn check(&self, condition: &Condition, context: &Value) -> Result<bool, EvalError> {
        match condition {
            Condition::Literal(value) => Ok(*value),
            Condition::All { all } => {
                for child in all {
                    if !self.check(child, context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any { any } => {
                for child in any {
                    if self.check(child, context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::NoneOf { none } => {
                for child in none {
                    if self.check(child, context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::IfThenElse {
                condition,
                then,
                otherwise,
            } => {
                if self.check(condition, context)? {
                    self.check(then, context)
                } else {
                    match otherwise {
                        Some(otherwise) => self.check(otherwise, context),
                        None => Ok(true),
                    }
                }
            }
            Condition::Leaf {
                field,
                operator,
                value,
            } => {
                let actual = lookup_path(context, field);
                let expected = match Condition::field_reference(value) {
                    Some(path) => lookup_path(context, path).cloned().unwrap_or(Value::Null),
                    None => value.clone(),
                };
                apply_operator(operator, actual, &expected)
            }
        }
    }
}

fn apply_operator(operator: &str, actual: Option<&Value>, expected: &Value) -> Result<bool, EvalError> {
    let left = actual.unwrap_or(&Value::Null);
    match operator {
        "equals" => Ok(left == expected),
        "notEquals" => Ok(left != expected),
        "in" => member_of(operator, left, expected),
        "notIn" => member_of(operator, left, expected).map(|found| !found),
        "greaterThan" => compare(operator, left, expected).map(|o| o == Ordering::Greater),
        "greaterThanOrEqual" => compare(operator, left, expected).map(|o| o != Ordering::Less),
        "lessThan" => compare(operator, left, expected).map(|o| o == Ordering::Less),
        "lessThanOrEqual" => compare(operator, left, expected).map(|o| o != Ordering::Greater),
        "contains" => contains(operator, left, expected),
        "notContains" => contains(operator, left, expected).map(|found| !found),
        "matches" => matches_pattern(operator, left, expected),
        "exists" => Ok(!left.is_null()),
        "notExists" => Ok(left.is_null()),
        other => Err(EvalError::UnknownOperator {
            operator: other.to_string(),
        }),
    }
}

fn mismatch(operator: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operator: operator.to_string(),
        left: kind(left).into(),
        right: kind(right).into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn member_of(operator: &str, left: &Value, expected: &Value) -> Result<bool, EvalError> {
    match expected {
        Value::Array(items) => Ok(items.contains(left)),
        other => Err(mismatch(operator, left, other)),
    }
}

fn compare(operator: &str, left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => l
            .as_f64()
            .zip(r.as_f64())
            .and_then(|(l, r)| l.partial_cmp(&r)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    };
    ordering.ok_or_else(|| mismatch(operator, left, right))
}

fn contains(operator: &str, left: &Value, expected: &Value) -> Result<bool, EvalError> {
    match (left, expected) {
        (Value::Array(items), needle) => Ok(items.contains(needle)),
        (Value::String(text), Value::String(needle)) => Ok(text.contains(needle.as_str())),
        _ => Err(mismatch(operator, left, expected)),
    }
}

fn matches_pattern(operator: &str, left: &Value, expected: &Value) -> Result<bool, EvalError> {
    let (Value::String(text), Value::String(pattern)) = (left, expected) else {
        return Err(mismatch(operator, left, expected));
    };
    let regex = Regex::new(pattern).map_err(|err| EvalError::InvalidPattern {
        pattern: pattern.clone(),
        message: err.to_string(),
    })?;
    Ok(regex.is_match(text))
}
