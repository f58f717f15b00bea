use crate::condition::Condition;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// How a field is presented. Unknown kinds are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Visualization {
    Hidden,
    Constant,
    Text,
    Textarea,
    Number,
    Email,
    Url,
    Password,
    Select,
    MultiSelect,
    Radio,
    Checkbox,
    ButtonGroup,
    MultiButtonGroup,
    Slider,
    Switch,
    DatePicker,
    TimePicker,
    DateTimePicker,
    ColorPicker,
    FilePicker,
    Custom,
    Other(String),
}

impl Visualization {
    pub fn as_str(&self) -> &str {
        match self {
            Visualization::Hidden => "hidden",
            Visualization::Constant => "constant",
            Visualization::Text => "text",
            Visualization::Textarea => "textarea",
            Visualization::Number => "number",
            Visualization::Email => "email",
            Visualization::Url => "url",
            Visualization::Password => "password",
            Visualization::Select => "select",
            Visualization::MultiSelect => "multiSelect",
            Visualization::Radio => "radio",
            Visualization::Checkbox => "checkbox",
            Visualization::ButtonGroup => "buttonGroup",
            Visualization::MultiButtonGroup => "multiButtonGroup",
            Visualization::Slider => "slider",
            Visualization::Switch => "switch",
            Visualization::DatePicker => "datePicker",
            Visualization::TimePicker => "timePicker",
            Visualization::DateTimePicker => "dateTimePicker",
            Visualization::ColorPicker => "colorPicker",
            Visualization::FilePicker => "filePicker",
            Visualization::Custom => "custom",
            Visualization::Other(other) => other,
        }
    }
}

impl From<String> for Visualization {
    fn from(value: String) -> Self {
        match value.as_str() {
            "hidden" => Visualization::Hidden,
            "constant" => Visualization::Constant,
            "text" => Visualization::Text,
            "textarea" => Visualization::Textarea,
            "number" => Visualization::Number,
            "email" => Visualization::Email,
            "url" => Visualization::Url,
            "password" => Visualization::Password,
            "select" => Visualization::Select,
            "multiSelect" => Visualization::MultiSelect,
            "radio" => Visualization::Radio,
            "checkbox" => Visualization::Checkbox,
            "buttonGroup" => Visualization::ButtonGroup,
            "multiButtonGroup" => Visualization::MultiButtonGroup,
            "slider" => Visualization::Slider,
            "switch" => Visualization::Switch,
            "datePicker" => Visualization::DatePicker,
            "timePicker" => Visualization::TimePicker,
            "dateTimePicker" => Visualization::DateTimePicker,
            "colorPicker" => Visualization::ColorPicker,
            "filePicker" => Visualization::FilePicker,
            "custom" => Visualization::Custom,
            _ => Visualization::Other(value),
        }
    }
}

impl From<&str> for Visualization {
    fn from(value: &str) -> Self {
        Visualization::from(value.to_string())
    }
}

impl From<Visualization> for String {
    fn from(value: Visualization) -> Self {
        match value {
            Visualization::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent key means "no value".
pub(crate) fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Selectable option of a form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub write_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_conditions: Option<Condition>,
}

impl FieldOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: value.into(),
            description: None,
            helper_text: None,
            tooltip: None,
            write_in: false,
            is_default: None,
            conditions: None,
            disabled_conditions: None,
        }
    }

    pub fn with_conditions(mut self, conditions: Condition) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn with_disabled_conditions(mut self, conditions: Condition) -> Self {
        self.disabled_conditions = Some(conditions);
        self
    }
}

/// Reusable element definition attached to entities through [`OwnedElement`](crate::OwnedElement).
///
/// `id` identifies the logical definition: entities sharing an id share one field variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[schemars(with = "String")]
    pub visualization: Visualization,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Value>")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_option_id: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Condition>,
}

impl FormElement {
    pub fn new(id: impl Into<String>, label: impl Into<String>, visualization: impl Into<Visualization>) -> Self {
        Self {
            id: id.into(),
            name: None,
            label: label.into(),
            description: None,
            helper_text: None,
            tooltip: None,
            visualization: visualization.into(),
            default_value: None,
            default_option_id: None,
            disabled: false,
            locked: false,
            config: None,
            options: None,
            conditions: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_conditions(mut self, conditions: Condition) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_default_option(mut self, option_id: impl Into<String>) -> Self {
        self.default_option_id = Some(option_id.into());
        self
    }

    /// `defaultValue`, overridden by the value of the option named by `defaultOptionId`.
    pub fn resolved_default(&self) -> Option<Value> {
        let from_option = self.default_option_id.as_ref().and_then(|option_id| {
            self.options
                .iter()
                .flatten()
                .find(|option| &option.id == option_id)
                .map(|option| option.value.clone())
        });
        from_option.or_else(|| self.default_value.clone())
    }
}
