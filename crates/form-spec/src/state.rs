use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use crate::dependencies::field_dependencies;
use crate::evaluator::{ConditionEvaluator, condition_holds};
use crate::spec::element::FieldOption;
use crate::spec::schema::{FormField, GeneratedFormSchema};

/// Option as it should be offered right now.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionState<'a> {
    pub option: &'a FieldOption,
    pub disabled: bool,
}

/// Render-independent state of one field key under a context.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState<'a> {
    pub applicable_field: Option<&'a FormField>,
    pub visible_options: Vec<OptionState<'a>>,
    pub dependencies: BTreeSet<String>,
}

impl FieldState<'_> {
    pub fn is_visible(&self) -> bool {
        self.applicable_field.is_some()
    }
}

/// Picks the variant that applies under `context` and filters its options.
///
/// When several variants apply, the first wins and a warning is logged.
pub fn resolve_field_state<'a, E>(
    evaluator: &E,
    key: &str,
    variants: &'a [FormField],
    context: &Value,
) -> FieldState<'a>
where
    E: ConditionEvaluator + ?Sized,
{
    let mut applicable = variants
        .iter()
        .filter(|field| condition_holds(evaluator, field.conditions.as_ref(), context));
    let applicable_field = applicable.next();
    if applicable_field.is_some() && applicable.next().is_some() {
        warn!(field = key, "multiple field definitions match; using the first");
    }

    let visible_options = applicable_field
        .and_then(|field| field.options.as_deref())
        .unwrap_or_default()
        .iter()
        .filter(|option| condition_holds(evaluator, option.conditions.as_ref(), context))
        .map(|option| OptionState {
            option,
            disabled: option
                .disabled_conditions
                .as_ref()
                .is_some_and(|disabled| condition_holds(evaluator, Some(disabled), context)),
        })
        .collect();

    FieldState {
        applicable_field,
        visible_options,
        dependencies: field_dependencies(variants),
    }
}

/// Whether any variant of `key` applies.
pub fn is_field_visible<E>(evaluator: &E, schema: &GeneratedFormSchema, key: &str, context: &Value) -> bool
where
    E: ConditionEvaluator + ?Sized,
{
    schema
        .variants(key)
        .iter()
        .any(|field| condition_holds(evaluator, field.conditions.as_ref(), context))
}

/// Options of the first applicable variant of `key` whose own conditions hold.
pub fn visible_options<'a, E>(
    evaluator: &E,
    schema: &'a GeneratedFormSchema,
    key: &str,
    context: &Value,
) -> Vec<&'a FieldOption>
where
    E: ConditionEvaluator + ?Sized,
{
    resolve_field_state(evaluator, key, schema.variants(key), context)
        .visible_options
        .into_iter()
        .map(|state| state.option)
        .collect()
}
