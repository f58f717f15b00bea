#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod context;
pub mod dependencies;
pub mod evaluator;
pub mod generate;
pub mod grouping;
pub mod selector;
pub mod spec;
pub mod state;
pub mod synthesize;
pub mod validate;

pub use answers::{FormSubmissionData, ValidationError, ValidationErrorCode, ValidationResult};
pub use condition::{Condition, FIELD_REFERENCE_PREFIX};
pub use context::{build_context, lookup_in, lookup_path};
pub use dependencies::{dependency_values, extract_dependencies, field_dependencies};
pub use evaluator::{ConditionEvaluator, EvalError, RulesEvaluator, condition_holds};
pub use generate::{SchemaError, check_model_groups, generate_form, try_generate_form};
pub use grouping::{GroupedFields, group_fields_by_key};
pub use selector::{determine_visualization, model_selector_field, record_label};
pub use spec::{
    Entity, FieldOption, FormElement, FormField, GeneratedFormSchema, ModelGroup, OwnedElement,
    Visualization,
};
pub use state::{FieldState, OptionState, is_field_visible, resolve_field_state, visible_options};
pub use synthesize::{compose_conditions, ownership_condition};
pub use validate::{SubmissionValidator, validate_form_submission};
