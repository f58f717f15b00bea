use crate::condition::Condition;
use crate::spec::element::{FieldOption, FormElement, Visualization, present_value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema-time field variant derived from a [`FormElement`] or a model group selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub label: String,
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
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_model: bool,
}

impl From<FormElement> for FormField {
    fn from(element: FormElement) -> Self {
        let default_value = element.resolved_default();
        Self {
            label: element.label,
            helper_text: element.helper_text,
            tooltip: element.tooltip,
            visualization: element.visualization,
            default_value,
            disabled: element.disabled,
            locked: element.locked,
            config: element.config,
            options: element.options,
            conditions: element.conditions,
            is_model: false,
        }
    }
}

/// Flat, condition-gated form schema produced by [`generate_form`](crate::generate_form).
///
/// `order` lists every key of `fields` exactly once: selector keys first, then element keys
/// in first-seen order. A key may carry several mutually exclusive variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedFormSchema {
    pub order: Vec<String>,
    pub fields: BTreeMap<String, Vec<FormField>>,
}

impl GeneratedFormSchema {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn variants(&self, key: &str) -> &[FormField] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Field keys with their variants, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FormField])> {
        self.order
            .iter()
            .filter_map(|key| self.fields.get(key).map(|fields| (key.as_str(), fields.as_slice())))
    }

    pub(crate) fn add_key(&mut self, key: &str) {
        if !self.order.iter().any(|existing| existing == key) {
            self.order.push(key.to_string());
        }
    }
}
