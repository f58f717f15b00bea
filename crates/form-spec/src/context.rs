use serde_json::{Map, Value};
use tracing::warn;

use crate::spec::model::ModelGroup;

/// Suffix of the context key under which a selected entity is exposed (`<key>Model`).
pub const MODEL_CONTEXT_SUFFIX: &str = "Model";

/// Resolves `path` against a JSON value.
///
/// A path naming an existing key verbatim wins (`"tournaments.0.name"` stored flat); otherwise
/// it is walked segment by segment, numeric segments indexing arrays.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    match root {
        Value::Object(map) => lookup_in(map, path),
        other => walk(other, path),
    }
}

/// [`lookup_path`] over an object map.
pub fn lookup_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    let next = map.get(head)?;
    lookup_path(next, rest)
}

fn walk<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|segment| !segment.is_empty()) {
        current = match current {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// JavaScript-style truthiness, used for "is a selection present" checks.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Builds the evaluation context for conditions.
///
/// Layers, later ones winning: `additional` (when it is an object), the current `values`,
/// and for every group whose selector holds a known record id the full record under
/// `<key>Model`.
pub fn build_context(
    additional: Option<&Value>,
    values: &Map<String, Value>,
    models: &[ModelGroup],
) -> Value {
    let mut context = additional
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (key, value) in values {
        context.insert(key.clone(), value.clone());
    }

    for group in models {
        let selected = values.get(&group.key);
        if !is_truthy(selected) {
            continue;
        }
        let Some(record) = selected
            .and_then(Value::as_str)
            .and_then(|id| group.record(id))
        else {
            continue;
        };
        match serde_json::to_value(record) {
            Ok(entity) => {
                context.insert(format!("{}{}", group.key, MODEL_CONTEXT_SUFFIX), entity);
            }
            Err(err) => warn!(model = %group.key, record = %record.id, %err, "unable to expose selected record"),
        }
    }

    Value::Object(context)
}
