use crate::spec::element::FormElement;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declares that `form_element` backs the field `key` whenever the owning entity is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedElement {
    pub key: String,
    pub form_element: FormElement,
}

/// Selectable record inside a model group.
///
/// Display attributes (`name`, `label`, `title`, anything else) are kept verbatim so the
/// whole entity can be exposed to conditions once it is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<OwnedElement>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_element(mut self, key: impl Into<String>, form_element: FormElement) -> Self {
        self.elements.push(OwnedElement {
            key: key.into(),
            form_element,
        });
        self
    }

    /// Human label for selector options: `name`, then `label`, then `title`, then the id.
    pub fn display_label(&self) -> String {
        ["name", "label", "title"]
            .iter()
            .filter_map(|key| self.attributes.get(*key))
            .find_map(label_text)
            .unwrap_or_else(|| self.id.clone())
    }
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// One facet of selectable configuration, contributing a selector field keyed by `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelGroup {
    pub label: String,
    pub key: String,
    #[serde(default)]
    pub records: Vec<Entity>,
}

impl ModelGroup {
    pub fn new(label: impl Into<String>, key: impl Into<String>, records: Vec<Entity>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            records,
        }
    }

    pub fn record(&self, id: &str) -> Option<&Entity> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn record_ids(&self) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| Value::String(record.id.clone()))
            .collect()
    }
}
