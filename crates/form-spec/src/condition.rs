use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix marking a leaf `value` as a reference to another field path (`"$.other.field"`).
pub const FIELD_REFERENCE_PREFIX: &str = "$.";

/// Operator name emitted for ownership conditions.
pub const EQUALS_OPERATOR: &str = "equals";

/// Condition tree gating field variants and options.
///
/// Serialized untagged so the wire shapes stay the plain JSON forms consumed by rule
/// evaluators: `true`, `{"all": [...]}`, `{"any": [...]}`, `{"none": [...]}`,
/// `{"if": ..., "then": ..., "else": ...}` and `{"field", "operator", "value"}` leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Condition {
    Literal(bool),
    All {
        all: Vec<Condition>,
    },
    Any {
        any: Vec<Condition>,
    },
    NoneOf {
        none: Vec<Condition>,
    },
    IfThenElse {
        #[serde(rename = "if")]
        condition: Box<Condition>,
        then: Box<Condition>,
        #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Condition>>,
    },
    Leaf {
        field: String,
        operator: String,
        #[serde(default)]
        value: Value,
    },
}

impl Condition {
    /// `{field, operator: "equals", value}` leaf.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Leaf {
            field: field.into(),
            operator: EQUALS_OPERATOR.to_string(),
            value: value.into(),
        }
    }

    pub fn leaf(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Leaf {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { all: conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { any: conditions }
    }

    pub fn none_of(conditions: Vec<Condition>) -> Self {
        Condition::NoneOf { none: conditions }
    }

    pub fn if_then_else(condition: Condition, then: Condition, otherwise: Option<Condition>) -> Self {
        Condition::IfThenElse {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// True for the literal `true` condition, which gates nothing.
    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Literal(true))
    }

    /// Returns the referenced field path when `value` is a `$.`-prefixed string.
    pub fn field_reference(value: &Value) -> Option<&str> {
        value.as_str()?.strip_prefix(FIELD_REFERENCE_PREFIX)
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(value)
    }
}
