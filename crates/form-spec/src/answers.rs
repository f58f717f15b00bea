use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat map of field key to submitted value. Keys are opaque strings, dots included.
pub type FormSubmissionData = Map<String, Value>;

/// Classes of problems the validator reports instead of repairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    /// Stored value matches no visible option and cannot be repaired unambiguously.
    StaleValue,
    /// Model selector points at a record that does not exist.
    InvalidSelection,
    /// More than one variant of a field applies at once.
    ConfigurationError,
}

/// Validation error metadata reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Value>,
    pub code: ValidationErrorCode,
}

impl ValidationError {
    pub(crate) fn new(code: ValidationErrorCode, field: &str, message: String, value: Value) -> Self {
        Self {
            field: field.to_string(),
            message,
            value: Some(value),
            expected_value: None,
            code,
        }
    }

    pub(crate) fn expecting(mut self, expected: Vec<Value>) -> Self {
        self.expected_value = Some(Value::Array(expected));
        self
    }
}

/// Result returned from `validate_form_submission`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub original: FormSubmissionData,
    pub updated: FormSubmissionData,
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

impl ValidationResult {
    pub fn errors(&self) -> &[ValidationError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.errors().iter().find(|error| error.field == field)
    }

    pub fn is_clean(&self) -> bool {
        !self.changed && self.errors.is_none()
    }
}
