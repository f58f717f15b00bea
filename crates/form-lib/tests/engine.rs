use std::cell::Cell;

use greentic_form_lib::{FormConfig, FormEngine, FormLibError};
use greentic_form_lib::form_spec::{SchemaError, ValidationResult};
use serde_json::{Value, json};

const MODELS: &str = r#"
[
  {
    "label": "Product",
    "key": "product",
    "records": [
      {
        "id": "prod-1",
        "name": "T-Shirt",
        "type": "physical",
        "elements": [
          {
            "key": "size",
            "formElement": {
              "id": "el-size",
              "label": "Size",
              "visualization": "select",
              "options": [
                { "id": "opt-s", "label": "Small", "value": "S" },
                { "id": "opt-m", "label": "Medium", "value": "M" }
              ]
            }
          },
          {
            "key": "perk",
            "formElement": {
              "id": "el-perk",
              "label": "Lounge access",
              "visualization": "text",
              "conditions": { "field": "userType", "operator": "equals", "value": "premium" }
            }
          }
        ]
      },
      {
        "id": "prod-2",
        "name": "E-Book",
        "type": "digital",
        "elements": [
          {
            "key": "format",
            "formElement": {
              "id": "el-format",
              "label": "Format",
              "visualization": "radio",
              "options": [
                { "id": "opt-pdf", "label": "PDF", "value": "pdf" },
                { "id": "opt-epub", "label": "EPUB", "value": "epub" }
              ]
            }
          }
        ]
      }
    ]
  }
]
"#;

fn premium() -> FormConfig {
    FormConfig::from_toml_str(
        r#"
        exempt_fields = ["draft"]
        [context]
        userType = "premium"
        "#,
    )
    .expect("config")
}

fn engine(config: FormConfig) -> FormEngine {
    FormEngine::from_json(MODELS, config).expect("engine should build")
}

fn object(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().expect("object fixture")
}

#[test]
fn schema_follows_model_order() {
    let engine = engine(FormConfig::default());
    assert_eq!(engine.schema().order, vec!["product", "size", "perk", "format"]);

    let raw = engine.schema_json().expect("schema serializes");
    let parsed: Value = serde_json::from_str(&raw).expect("schema json");
    assert_eq!(parsed["fields"]["product"][0]["isModel"], json!(true));
    assert_eq!(parsed["fields"]["product"][0]["visualization"], json!("radio"));
}

#[test]
fn strict_mode_rejects_duplicate_model_keys() {
    let doubled = format!(
        "[{}, {}]",
        MODELS.trim().trim_start_matches('[').trim_end_matches(']'),
        r#"{ "label": "Again", "key": "product", "records": [] }"#
    );
    let strict = FormConfig {
        strict_schema: true,
        ..FormConfig::default()
    };

    let err = FormEngine::from_json(&doubled, strict).unwrap_err();
    assert!(matches!(
        err,
        FormLibError::Schema(SchemaError::DuplicateModelKey { ref key }) if key == "product"
    ));

    let lenient = FormEngine::from_json(&doubled, FormConfig::default()).expect("lenient build");
    assert!(lenient.schema().variants("product")[0].options.as_ref().unwrap().is_empty());
}

#[test]
fn configured_context_and_exemptions_apply() {
    let submission = json!({ "product": "prod-1", "size": "S", "perk": "lounge", "draft": "wip" });

    let result = engine(premium()).validate(&object(submission.clone()));
    assert!(result.is_clean());
    assert_eq!(Value::Object(result.updated), submission);

    let result = engine(FormConfig::default()).validate(&object(submission));
    assert!(result.changed);
    assert_eq!(
        Value::Object(result.updated),
        json!({ "product": "prod-1", "size": "S" })
    );
}

#[test]
fn validate_json_round_trips() {
    let engine = engine(premium());
    let raw = engine
        .validate_json(r#"{ "product": "prod-1", "size": "XL" }"#)
        .expect("validation json");
    let result: ValidationResult = serde_json::from_str(&raw).expect("result json");

    assert!(result.changed);
    assert!(!result.updated.contains_key("size"));
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].expected_value, Some(json!(["S", "M"])));
}

#[test]
fn validate_json_rejects_bad_input() {
    let engine = engine(FormConfig::default());
    assert!(matches!(
        engine.validate_json("[1, 2]"),
        Err(FormLibError::SubmissionNotObject)
    ));
    assert!(matches!(engine.validate_json("{"), Err(FormLibError::Json(_))));
}

#[test]
fn session_tracks_visibility_as_values_change() {
    let engine = engine(premium());
    let mut session = engine.session();
    assert_eq!(session.visible_fields(), vec!["product"]);
    assert!(!session.is_field_visible("size"));

    session.set_value("product", json!("prod-1"));
    assert_eq!(session.visible_fields(), vec!["product", "size", "perk"]);
    let state = session.field_state("size");
    assert!(state.is_visible());
    assert_eq!(state.visible_options.len(), 2);
    assert!(session.visible_options("format").is_empty());
    assert_eq!(session.context()["productModel"]["type"], json!("physical"));

    let deps: Vec<String> = session.field_dependencies("perk").into_iter().collect();
    assert_eq!(deps, vec!["product", "userType"]);

    session.set_value("product", json!("prod-2"));
    assert_eq!(session.visible_fields(), vec!["product", "format"]);
    let formats: Vec<&Value> = session
        .visible_options("format")
        .into_iter()
        .map(|option| &option.value)
        .collect();
    assert_eq!(formats, vec![&json!("pdf"), &json!("epub")]);
}

#[test]
fn heal_adopts_repaired_values_and_reset_restores_initial_ones() {
    let changes = Cell::new(0);
    let engine = engine(FormConfig::default());
    let initial = object(json!({ "product": "prod-2", "size": "S" }));
    let mut session = engine
        .session_with(initial.clone())
        .on_change(|_| changes.set(changes.get() + 1));

    let result = session.heal();
    assert!(result.changed);
    assert_eq!(Value::Object(session.values().clone()), json!({ "product": "prod-2" }));
    assert_eq!(changes.get(), 1);

    let again = session.heal();
    assert!(!again.changed);
    assert_eq!(changes.get(), 1);

    session.set_values(object(json!({ "product": "prod-1" })));
    assert_eq!(changes.get(), 2);
    session.reset();
    assert_eq!(session.values(), &initial);
    assert_eq!(changes.get(), 3);
}
