use form_spec::{
    Condition, Entity, FieldOption, FormElement, GeneratedFormSchema, ModelGroup, RulesEvaluator,
    build_context, generate_form, is_field_visible, resolve_field_state, visible_options,
};
use serde_json::{Map, Value, json};

fn schema() -> (Vec<ModelGroup>, GeneratedFormSchema) {
    let size = FormElement::new("el-size", "Size", "select").with_options(vec![
        FieldOption::new("opt-s", "Small", "S"),
        FieldOption::new("opt-m", "Medium", "M")
            .with_disabled_conditions(Condition::equals("stock.m", 0)),
        FieldOption::new("opt-xl", "Extra large", "XL")
            .with_conditions(Condition::equals("region", "eu")),
    ]);
    let format = FormElement::new("el-format", "Format", "radio").with_options(vec![
        FieldOption::new("opt-pdf", "PDF", "pdf"),
        FieldOption::new("opt-epub", "EPUB", "epub"),
    ]);
    let models = vec![ModelGroup::new(
        "Product",
        "product",
        vec![
            Entity::new("prod-1")
                .with_attribute("name", "T-Shirt")
                .with_element("size", size),
            Entity::new("prod-2")
                .with_attribute("name", "E-Book")
                .with_element("format", format),
        ],
    )];
    let schema = generate_form(&models);
    (models, schema)
}

fn context(models: &[ModelGroup], values: Value, additional: Value) -> Value {
    let values: Map<String, Value> = values.as_object().cloned().unwrap_or_default();
    build_context(Some(&additional), &values, models)
}

#[test]
fn applicable_variant_exposes_visible_and_disabled_options() {
    let (models, schema) = schema();
    let ctx = context(
        &models,
        json!({ "product": "prod-1" }),
        json!({ "region": "us", "stock": { "m": 0 } }),
    );

    let state = resolve_field_state(&RulesEvaluator, "size", schema.variants("size"), &ctx);
    assert!(state.is_visible());
    assert_eq!(state.applicable_field.unwrap().label, "Size");
    let offered: Vec<(&str, bool)> = state
        .visible_options
        .iter()
        .map(|option| (option.option.id.as_str(), option.disabled))
        .collect();
    assert_eq!(offered, vec![("opt-s", false), ("opt-m", true)]);
    assert_eq!(
        state.dependencies.into_iter().collect::<Vec<_>>(),
        vec!["product".to_string(), "region".to_string()]
    );
}

#[test]
fn hidden_field_has_no_options() {
    let (models, schema) = schema();
    let ctx = context(&models, json!({ "product": "prod-2" }), json!({}));

    let state = resolve_field_state(&RulesEvaluator, "size", schema.variants("size"), &ctx);
    assert!(!state.is_visible());
    assert!(state.visible_options.is_empty());
    assert!(!is_field_visible(&RulesEvaluator, &schema, "size", &ctx));
    assert!(is_field_visible(&RulesEvaluator, &schema, "format", &ctx));
    assert!(is_field_visible(&RulesEvaluator, &schema, "product", &ctx));
}

#[test]
fn unknown_keys_are_never_visible() {
    let (models, schema) = schema();
    let ctx = context(&models, json!({ "product": "prod-1" }), json!({}));
    assert!(!is_field_visible(&RulesEvaluator, &schema, "nope", &ctx));
    assert!(visible_options(&RulesEvaluator, &schema, "nope", &ctx).is_empty());
}

#[test]
fn visible_options_follow_the_context() {
    let (models, schema) = schema();
    let eu = context(&models, json!({ "product": "prod-1" }), json!({ "region": "eu" }));
    let values: Vec<&Value> = visible_options(&RulesEvaluator, &schema, "size", &eu)
        .into_iter()
        .map(|option| &option.value)
        .collect();
    assert_eq!(values, vec![&json!("S"), &json!("M"), &json!("XL")]);

    let selector = visible_options(&RulesEvaluator, &schema, "product", &eu);
    assert_eq!(selector.len(), 2);
}

#[test]
fn first_applicable_variant_wins() {
    let plans = ModelGroup::new(
        "Plan",
        "plan",
        vec![Entity::new("basic").with_element("notes", FormElement::new("el-plan", "Plan notes", "text"))],
    );
    let regions = ModelGroup::new(
        "Region",
        "region",
        vec![Entity::new("eu").with_element("notes", FormElement::new("el-region", "Region notes", "text"))],
    );
    let models = vec![plans, regions];
    let schema = generate_form(&models);
    let ctx = context(&models, json!({ "plan": "basic", "region": "eu" }), json!({}));

    let state = resolve_field_state(&RulesEvaluator, "notes", schema.variants("notes"), &ctx);
    assert_eq!(state.applicable_field.unwrap().label, "Plan notes");
}

#[test]
fn selected_record_is_exposed_under_model_suffix() {
    let (models, _) = schema();
    let ctx = context(&models, json!({ "product": "prod-2" }), json!({ "productModel": "stale" }));
    assert_eq!(ctx["productModel"]["id"], json!("prod-2"));
    assert_eq!(ctx["productModel"]["name"], json!("E-Book"));

    let unknown = context(&models, json!({ "product": "prod-9" }), json!({}));
    assert!(unknown.get("productModel").is_none());
    assert_eq!(unknown["product"], json!("prod-9"));
}
