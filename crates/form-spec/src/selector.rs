use serde_json::Value;

use crate::condition::Condition;
use crate::spec::element::{FieldOption, Visualization};
use crate::spec::model::{Entity, ModelGroup};
use crate::spec::schema::{FormField, GeneratedFormSchema};

/// Largest record count still rendered as radio buttons.
pub const RADIO_OPTION_LIMIT: usize = 4;

/// Radio for up to four choices, select beyond that.
pub fn determine_visualization(option_count: usize) -> Visualization {
    if option_count <= RADIO_OPTION_LIMIT {
        Visualization::Radio
    } else {
        Visualization::Select
    }
}

pub fn record_label(record: &Entity) -> String {
    record.display_label()
}

/// Builds the always-visible selector field for a model group.
pub fn model_selector_field(group: &ModelGroup) -> FormField {
    let options = group
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| FieldOption {
            is_default: Some(index == 0),
            ..FieldOption::new(
                format!("{}-option-{}", group.key, index),
                record_label(record),
                Value::String(record.id.clone()),
            )
        })
        .collect::<Vec<_>>();

    FormField {
        label: group.label.clone(),
        helper_text: None,
        tooltip: None,
        visualization: determine_visualization(group.records.len()),
        default_value: group
            .records
            .first()
            .map(|record| Value::String(record.id.clone())),
        disabled: false,
        locked: false,
        config: None,
        options: Some(options),
        conditions: Some(Condition::Literal(true)),
        is_model: true,
    }
}

/// Registers the group's selector under its key, replacing anything already stored there.
pub(crate) fn add_model_selector_field(group: &ModelGroup, schema: &mut GeneratedFormSchema) {
    schema.add_key(&group.key);
    schema
        .fields
        .insert(group.key.clone(), vec![model_selector_field(group)]);
}
