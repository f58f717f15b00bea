use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::answers::{FormSubmissionData, ValidationError, ValidationErrorCode, ValidationResult};
use crate::condition::Condition;
use crate::context::{build_context, is_truthy};
use crate::evaluator::{ConditionEvaluator, RulesEvaluator, condition_holds};
use crate::generate::generate_form;
use crate::spec::element::FieldOption;
use crate::spec::model::ModelGroup;
use crate::spec::schema::{FormField, GeneratedFormSchema};

static DEFAULT_EVALUATOR: RulesEvaluator = RulesEvaluator;

/// Repairs previously submitted data against the schema regenerated from `models`, using the
/// built-in [`RulesEvaluator`].
pub fn validate_form_submission(
    submission: &FormSubmissionData,
    models: &[ModelGroup],
    exempt_fields: &[String],
    additional_context: Option<&Value>,
) -> ValidationResult {
    SubmissionValidator::new(models)
        .exempt(exempt_fields)
        .context(additional_context)
        .validate(submission)
}

/// Configurable entry point for submission self-healing.
///
/// Each field is dealt with independently: values that no longer fit are removed, values with
/// exactly one valid replacement are repaired, and anything ambiguous is reported. Nothing here
/// fails; problems end up in [`ValidationResult::errors`].
pub struct SubmissionValidator<'a> {
    models: &'a [ModelGroup],
    exempt_fields: &'a [String],
    additional_context: Option<&'a Value>,
    evaluator: &'a dyn ConditionEvaluator,
}

impl<'a> SubmissionValidator<'a> {
    pub fn new(models: &'a [ModelGroup]) -> Self {
        Self {
            models,
            exempt_fields: &[],
            additional_context: None,
            evaluator: &DEFAULT_EVALUATOR,
        }
    }

    pub fn exempt(mut self, exempt_fields: &'a [String]) -> Self {
        self.exempt_fields = exempt_fields;
        self
    }

    pub fn context(mut self, additional_context: Option<&'a Value>) -> Self {
        self.additional_context = additional_context;
        self
    }

    pub fn evaluator(mut self, evaluator: &'a dyn ConditionEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn validate(&self, submission: &FormSubmissionData) -> ValidationResult {
        let schema = generate_form(self.models);
        let mut pass = Pass {
            validator: self,
            model_keys: self.models.iter().map(|group| group.key.as_str()).collect(),
            updated: submission.clone(),
            errors: Vec::new(),
            changed: false,
        };

        pass.check_submitted_fields(&schema);
        pass.fill_missing_fields(&schema);
        pass.check_model_selections();

        let Pass {
            mut updated,
            errors,
            changed,
            ..
        } = pass;
        let changed = changed || updated != *submission;
        self.sanitize(&schema, &mut updated);

        ValidationResult {
            original: submission.clone(),
            updated,
            changed,
            errors: (!errors.is_empty()).then_some(errors),
        }
    }

    fn is_exempt(&self, key: &str) -> bool {
        self.exempt_fields.iter().any(|field| field == key)
    }

    /// Keeps only schema fields, selectors and exempt fields; selectors holding a whole
    /// record are collapsed back to its id.
    fn sanitize(&self, schema: &GeneratedFormSchema, updated: &mut FormSubmissionData) {
        updated.retain(|key, _| {
            schema.fields.contains_key(key)
                || self.models.iter().any(|group| &group.key == key)
                || self.is_exempt(key)
        });

        for group in self.models {
            let Some(Value::Object(record)) = updated.get(&group.key) else {
                continue;
            };
            let id = record.get("id");
            if is_truthy(id) {
                let id = id.cloned().unwrap_or_default();
                updated.insert(group.key.clone(), id);
            }
        }
    }
}

struct Pass<'v, 'a> {
    validator: &'v SubmissionValidator<'a>,
    model_keys: BTreeSet<&'a str>,
    updated: FormSubmissionData,
    errors: Vec<ValidationError>,
    changed: bool,
}

impl Pass<'_, '_> {
    fn skips(&self, key: &str) -> bool {
        self.model_keys.contains(key) || self.validator.is_exempt(key)
    }

    fn context(&self) -> Value {
        build_context(
            self.validator.additional_context,
            &self.updated,
            self.validator.models,
        )
    }

    fn holds(&self, condition: Option<&Condition>, context: &Value) -> bool {
        condition_holds(self.validator.evaluator, condition, context)
    }

    fn applicable<'s>(&self, variants: &'s [FormField], context: &Value) -> Vec<&'s FormField> {
        variants
            .iter()
            .filter(|field| self.holds(field.conditions.as_ref(), context))
            .collect()
    }

    fn visible<'s>(&self, options: &'s [FieldOption], context: &Value) -> Vec<&'s FieldOption> {
        options
            .iter()
            .filter(|option| self.holds(option.conditions.as_ref(), context))
            .collect()
    }

    fn remove(&mut self, key: &str, reason: &str) {
        debug!(field = key, reason, "removing submitted value");
        self.updated.remove(key);
        self.changed = true;
    }

    fn assign(&mut self, key: &str, value: Value, reason: &str) {
        debug!(field = key, %value, reason, "assigning value");
        self.updated.insert(key.to_string(), value);
        self.changed = true;
    }

    fn check_submitted_fields(&mut self, schema: &GeneratedFormSchema) {
        let keys = self.updated.keys().cloned().collect::<Vec<_>>();
        for key in keys {
            if self.skips(&key) {
                continue;
            }
            let Some(value) = self.updated.get(&key).cloned() else {
                continue;
            };

            let variants = schema.variants(&key);
            if variants.is_empty() {
                self.remove(&key, "field is not part of the schema");
                continue;
            }

            let context = self.context();
            match self.applicable(variants, &context).as_slice() {
                [] => self.remove(&key, "no field variant applies"),
                [field] => self.check_options(&key, field, value, &context),
                _ => {
                    warn!(field = %key, "several field variants apply at once");
                    self.errors.push(ValidationError::new(
                        ValidationErrorCode::ConfigurationError,
                        &key,
                        format!(
                            "Configuration error: Multiple field definitions match conditions for \"{key}\""
                        ),
                        value,
                    ));
                }
            }
        }
    }

    fn check_options(&mut self, key: &str, field: &FormField, value: Value, context: &Value) {
        let Some(options) = field.options.as_deref() else {
            return;
        };

        match options.iter().find(|option| option.value == value) {
            None => {
                let visible = self.visible(options, context);
                match visible.as_slice() {
                    [] => self.remove(key, "no option is visible"),
                    [only] => self.assign(key, only.value.clone(), "only visible option"),
                    _ => {
                        let expected: Vec<Value> = visible.iter().map(|option| option.value.clone()).collect();
                        self.remove(key, "value matches no option");
                        self.errors.push(
                            ValidationError::new(
                                ValidationErrorCode::StaleValue,
                                key,
                                format!("Invalid value for field \"{}\"", field.label),
                                value,
                            )
                            .expecting(expected),
                        );
                    }
                }
            }
            Some(selected) if !self.holds(selected.conditions.as_ref(), context) => {
                let replacement = options
                    .iter()
                    .find(|option| self.holds(option.conditions.as_ref(), context));
                match replacement {
                    Some(replacement) => {
                        self.assign(key, replacement.value.clone(), "selected option hidden")
                    }
                    None => {
                        warn!(field = key, "selected option is no longer valid");
                        self.errors.push(ValidationError::new(
                            ValidationErrorCode::StaleValue,
                            key,
                            format!("Selected option is no longer valid for field \"{}\"", field.label),
                            value,
                        ));
                    }
                }
            }
            Some(_) => {}
        }
    }

    fn fill_missing_fields(&mut self, schema: &GeneratedFormSchema) {
        for (key, variants) in schema.iter() {
            if self.skips(key) || self.updated.contains_key(key) {
                continue;
            }

            let context = self.context();
            let applicable = self.applicable(variants, &context);
            let [field] = applicable.as_slice() else {
                continue;
            };

            if let Some(default) = &field.default_value {
                self.assign(key, default.clone(), "default value");
                continue;
            }
            let Some(options) = field.options.as_deref() else {
                continue;
            };
            let visible = self.visible(options, &context);
            if let [only] = visible.as_slice() {
                self.assign(key, only.value.clone(), "only visible option");
            }
        }
    }

    fn check_model_selections(&mut self) {
        let validator = self.validator;
        for group in validator.models {
            if validator.is_exempt(&group.key) {
                continue;
            }

            let selected = self.updated.get(&group.key).cloned();
            let Some(selected) = selected.filter(|value| is_truthy(Some(value))) else {
                if let Some(first) = group.records.first() {
                    self.assign(&group.key, Value::String(first.id.clone()), "first record");
                }
                continue;
            };
            let known = selected.as_str().and_then(|id| group.record(id)).is_some();
            if !known {
                warn!(model = %group.key, value = %selected, "selection points at an unknown record");
                self.errors.push(
                    ValidationError::new(
                        ValidationErrorCode::InvalidSelection,
                        &group.key,
                        format!("Invalid selection for {}", group.label),
                        selected,
                    )
                    .expecting(group.record_ids()),
                );
            }
        }
    }
}
