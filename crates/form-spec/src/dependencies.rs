use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::condition::Condition;
use crate::context::lookup_in;
use crate::spec::schema::FormField;

/// Collects every field path a condition tree reads.
///
/// Leaves contribute their `field` plus the target of a `$.` value reference; combinators
/// and `if`/`then`/`else` recurse into every child. Absent and literal conditions read nothing.
pub fn extract_dependencies(condition: Option<&Condition>) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    if let Some(condition) = condition {
        collect(condition, &mut dependencies);
    }
    dependencies
}

fn collect(condition: &Condition, out: &mut BTreeSet<String>) {
    match condition {
        Condition::Literal(_) => {}
        Condition::All { all: children }
        | Condition::Any { any: children }
        | Condition::NoneOf { none: children } => {
            for child in children {
                collect(child, out);
            }
        }
        Condition::IfThenElse {
            condition,
            then,
            otherwise,
        } => {
            collect(condition, out);
            collect(then, out);
            if let Some(otherwise) = otherwise {
                collect(otherwise, out);
            }
        }
        Condition::Leaf { field, value, .. } => {
            if !field.is_empty() {
                out.insert(field.clone());
            }
            if let Some(reference) = Condition::field_reference(value) {
                out.insert(reference.to_string());
            }
        }
    }
}

/// Union of the dependencies of every variant and every option of a field key.
pub fn field_dependencies(variants: &[FormField]) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    for field in variants {
        dependencies.extend(extract_dependencies(field.conditions.as_ref()));
        for option in field.options.iter().flatten() {
            dependencies.extend(extract_dependencies(option.conditions.as_ref()));
        }
    }
    dependencies
}

/// Current value for each dependency path, in set order; `None` when the path is unset.
pub fn dependency_values(dependencies: &BTreeSet<String>, values: &Map<String, Value>) -> Vec<Option<Value>> {
    dependencies
        .iter()
        .map(|path| lookup_in(values, path).cloned())
        .collect()
}
