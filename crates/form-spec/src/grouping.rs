use std::collections::BTreeMap;

use crate::spec::element::FormElement;
use crate::spec::model::{Entity, ModelGroup};
use crate::spec::schema::{FormField, GeneratedFormSchema};
use crate::synthesize::{compose_conditions, ownership_condition};

/// Element definitions of one model group, bucketed by target field key in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedFields {
    entries: Vec<(String, Vec<FormElement>)>,
}

impl GroupedFields {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&[FormElement]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, elements)| elements.as_slice())
    }

    pub fn into_entries(self) -> Vec<(String, Vec<FormElement>)> {
        self.entries
    }

    fn bucket(&mut self, key: &str) -> &mut Vec<FormElement> {
        let index = match self.entries.iter().position(|(existing, _)| existing == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

/// Groups every owned element of `records` by field key.
///
/// Definitions sharing a `formElement.id` within one key are kept once (first copy wins);
/// every owning record id is tracked per element id and turned into an ownership condition on
/// `model_key`, composed with the element's own conditions. Definitions are cloned, never
/// mutated in place.
pub fn group_fields_by_key(records: &[Entity], model_key: &str) -> GroupedFields {
    let mut grouped = GroupedFields::default();
    let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for record in records {
        for element in &record.elements {
            let form_element = &element.form_element;
            owners
                .entry(form_element.id.as_str())
                .or_default()
                .push(record.id.clone());

            let bucket = grouped.bucket(&element.key);
            if !bucket.iter().any(|existing| existing.id == form_element.id) {
                bucket.push(form_element.clone());
            }
        }
    }

    for (_, elements) in &mut grouped.entries {
        for element in elements.iter_mut() {
            let owner_ids = owners.get(element.id.as_str()).map(Vec::as_slice).unwrap_or_default();
            let ownership = ownership_condition(model_key, owner_ids);
            element.conditions = Some(compose_conditions(element.conditions.take(), ownership));
        }
    }

    grouped
}

/// Appends the group's element variants to the schema, after anything earlier groups added.
pub(crate) fn add_form_element_fields(group: &ModelGroup, schema: &mut GeneratedFormSchema) {
    for (field_key, elements) in group_fields_by_key(&group.records, &group.key).into_entries() {
        schema.add_key(&field_key);
        schema
            .fields
            .entry(field_key)
            .or_default()
            .extend(elements.into_iter().map(FormField::from));
    }
}
