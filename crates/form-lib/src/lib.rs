use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use form_spec::{
    FieldOption, FieldState, FormSubmissionData, GeneratedFormSchema, ModelGroup, RulesEvaluator,
    SchemaError, SubmissionValidator, ValidationResult, build_context, field_dependencies,
    generate_form, is_field_visible, resolve_field_state, try_generate_form, visible_options,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

pub use form_spec;

/// Knobs shared by every validation run of a [`FormEngine`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Reject model groups whose keys collide instead of letting later entries win.
    pub strict_schema: bool,
    pub exempt_fields: Vec<String>,
    /// Extra values visible to conditions, below the submission itself.
    pub context: Map<String, Value>,
}

impl FormConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, FormLibError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormLibError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| FormLibError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(path = %path.display(), strict = config.strict_schema, "loaded form config");
        Ok(config)
    }

    fn additional_context(&self) -> Option<Value> {
        (!self.context.is_empty()).then(|| Value::Object(self.context.clone()))
    }
}

#[derive(Debug, Error)]
pub enum FormLibError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("submission must be a JSON object map of field key -> value")]
    SubmissionNotObject,
}

/// Model groups, their generated schema, and the configuration to validate against them.
#[derive(Clone, Debug)]
pub struct FormEngine {
    models: Vec<ModelGroup>,
    config: FormConfig,
    context: Option<Value>,
    schema: GeneratedFormSchema,
}

impl FormEngine {
    pub fn new(models: Vec<ModelGroup>, config: FormConfig) -> Result<Self, FormLibError> {
        let schema = if config.strict_schema {
            try_generate_form(&models)?
        } else {
            generate_form(&models)
        };
        info!(
            groups = models.len(),
            fields = schema.order.len(),
            strict = config.strict_schema,
            "form schema generated"
        );

        Ok(Self {
            context: config.additional_context(),
            models,
            config,
            schema,
        })
    }

    /// Parses a JSON array of model groups.
    pub fn from_json(models_json: &str, config: FormConfig) -> Result<Self, FormLibError> {
        let models: Vec<ModelGroup> = serde_json::from_str(models_json)?;
        Self::new(models, config)
    }

    pub fn models(&self) -> &[ModelGroup] {
        &self.models
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn schema(&self) -> &GeneratedFormSchema {
        &self.schema
    }

    pub fn schema_json(&self) -> Result<String, FormLibError> {
        Ok(serde_json::to_string(&self.schema)?)
    }

    pub fn validate(&self, submission: &FormSubmissionData) -> ValidationResult {
        let result = SubmissionValidator::new(&self.models)
            .exempt(&self.config.exempt_fields)
            .context(self.context.as_ref())
            .validate(submission);
        debug!(
            changed = result.changed,
            errors = result.errors().len(),
            "submission validated"
        );
        result
    }

    /// JSON-in, JSON-out variant of [`FormEngine::validate`].
    pub fn validate_json(&self, submission_json: &str) -> Result<String, FormLibError> {
        let Value::Object(submission) = serde_json::from_str::<Value>(submission_json)? else {
            return Err(FormLibError::SubmissionNotObject);
        };
        Ok(serde_json::to_string(&self.validate(&submission))?)
    }

    /// Evaluation context for `values`: configured context, the values, and selected records.
    pub fn context_for(&self, values: &FormSubmissionData) -> Value {
        build_context(self.context.as_ref(), values, &self.models)
    }

    pub fn session(&self) -> FormSession<'_> {
        FormSession::new(self, FormSubmissionData::new())
    }

    pub fn session_with(&self, initial_values: FormSubmissionData) -> FormSession<'_> {
        FormSession::new(self, initial_values)
    }
}

pub type ChangeListener<'e> = dyn FnMut(&FormSubmissionData) + 'e;

/// In-progress form values with per-field state derived on demand.
pub struct FormSession<'e> {
    engine: &'e FormEngine,
    initial: FormSubmissionData,
    values: FormSubmissionData,
    on_change: Option<Box<ChangeListener<'e>>>,
}

impl<'e> FormSession<'e> {
    fn new(engine: &'e FormEngine, initial: FormSubmissionData) -> Self {
        Self {
            engine,
            values: initial.clone(),
            initial,
            on_change: None,
        }
    }

    /// Called with the full value map after every mutation.
    pub fn on_change(mut self, listener: impl FnMut(&FormSubmissionData) + 'e) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    pub fn values(&self) -> &FormSubmissionData {
        &self.values
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
        self.notify();
    }

    /// Replaces every value at once.
    pub fn set_values(&mut self, values: FormSubmissionData) {
        self.values = values;
        self.notify();
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.notify();
    }

    pub fn context(&self) -> Value {
        self.engine.context_for(&self.values)
    }

    pub fn field_dependencies(&self, key: &str) -> BTreeSet<String> {
        field_dependencies(self.engine.schema.variants(key))
    }

    pub fn is_field_visible(&self, key: &str) -> bool {
        is_field_visible(&RulesEvaluator, &self.engine.schema, key, &self.context())
    }

    pub fn visible_options(&self, key: &str) -> Vec<&'e FieldOption> {
        let engine: &'e FormEngine = self.engine;
        let schema = &engine.schema;
        visible_options(&RulesEvaluator, schema, key, &self.context())
    }

    pub fn field_state(&self, key: &str) -> FieldState<'e> {
        let engine: &'e FormEngine = self.engine;
        let schema = &engine.schema;
        resolve_field_state(&RulesEvaluator, key, schema.variants(key), &self.context())
    }

    /// Schema keys whose field currently applies, in display order.
    pub fn visible_fields(&self) -> Vec<&'e str> {
        let engine: &'e FormEngine = self.engine;
        let schema = &engine.schema;
        let context = self.context();
        schema
            .order
            .iter()
            .map(String::as_str)
            .filter(|key| is_field_visible(&RulesEvaluator, schema, key, &context))
            .collect()
    }

    /// Validates the current values and adopts the repaired ones when anything changed.
    pub fn heal(&mut self) -> ValidationResult {
        let result = self.engine.validate(&self.values);
        if result.changed {
            self.values = result.updated.clone();
            self.notify();
        }
        result
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.values);
        }
    }
}
