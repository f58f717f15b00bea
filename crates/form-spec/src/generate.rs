use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::grouping::add_form_element_fields;
use crate::selector::add_model_selector_field;
use crate::spec::model::ModelGroup;
use crate::spec::schema::GeneratedFormSchema;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate model group key '{key}'")]
    DuplicateModelKey { key: String },
    #[error("element field '{field}' in model group '{model_key}' shadows a model selector")]
    FieldKeyShadowsModel { field: String, model_key: String },
    #[error(
        "form element '{element_id}' in model group '{model_key}' targets several fields: {fields:?}"
    )]
    ElementIdReused {
        element_id: String,
        model_key: String,
        fields: Vec<String>,
    },
}

/// Synthesizes the flat form schema for `models`.
///
/// Selectors for every group are emitted first, then each group's element fields, so every
/// selector key precedes every element key in `order`. Inputs are never mutated.
pub fn generate_form(models: &[ModelGroup]) -> GeneratedFormSchema {
    let mut schema = GeneratedFormSchema::default();
    if models.is_empty() {
        return schema;
    }

    for group in models {
        add_model_selector_field(group, &mut schema);
    }
    for group in models {
        add_form_element_fields(group, &mut schema);
    }

    schema
}

/// [`generate_form`] that refuses ambiguous inputs instead of silently overwriting.
pub fn try_generate_form(models: &[ModelGroup]) -> Result<GeneratedFormSchema, SchemaError> {
    check_model_groups(models)?;
    Ok(generate_form(models))
}

/// Checks the uniqueness assumptions [`generate_form`] relies on.
pub fn check_model_groups(models: &[ModelGroup]) -> Result<(), SchemaError> {
    let mut model_keys = BTreeSet::new();
    for group in models {
        if !model_keys.insert(group.key.as_str()) {
            return Err(SchemaError::DuplicateModelKey {
                key: group.key.clone(),
            });
        }
    }

    for group in models {
        let mut targets: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for element in group.records.iter().flat_map(|record| &record.elements) {
            if model_keys.contains(element.key.as_str()) {
                return Err(SchemaError::FieldKeyShadowsModel {
                    field: element.key.clone(),
                    model_key: group.key.clone(),
                });
            }
            let fields = targets.entry(element.form_element.id.as_str()).or_default();
            if !fields.contains(&element.key) {
                fields.push(element.key.clone());
            }
        }

        if let Some((element_id, fields)) = targets.into_iter().find(|(_, fields)| fields.len() > 1) {
            return Err(SchemaError::ElementIdReused {
                element_id: element_id.to_string(),
                model_key: group.key.clone(),
                fields,
            });
        }
    }

    Ok(())
}
