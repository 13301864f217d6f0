//! Record validation through `#[derive(Record)]`.

use fieldcheck_macros::Record;
use fieldcheck_validate::{
    flatten, rule_table, ConfigError, Int, Int64, Options, RuleInput, RuleRegistry, RuleResult,
    Validator, Value,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, Record)]
#[field(crate = "fieldcheck_validate")]
struct Inner {
    value: i64,
}

#[derive(Debug, Default, Deserialize, Record)]
#[field(crate = "fieldcheck_validate")]
struct Address {
    #[field(json = "zip")]
    zip: String,
    city: String,
}

#[derive(Debug, Default, Deserialize, Record)]
#[field(crate = "fieldcheck_validate")]
#[serde(default)]
struct Profile {
    #[field(json = "name|omitempty", form = "full_name")]
    name: String,
    #[serde(rename = "mail")]
    email: String,
    #[serde(skip)]
    password: String,
    #[field(skip)]
    internal: Vec<u8>,
    age: Int,
    inner: Inner,
    address: Option<Address>,
    extras: HashMap<String, serde_json::Value>,
}

fn registry() -> Arc<RuleRegistry> {
    Arc::new(RuleRegistry::with_defaults())
}

#[test]
fn derived_names_follow_annotations() {
    let profile = Profile {
        name: "Jane".into(),
        email: "jane@example.com".into(),
        password: "secret".into(),
        internal: vec![1],
        age: Int::new(30),
        inner: Inner { value: 5 },
        address: Some(Address {
            zip: "12345".into(),
            city: "Dhaka".into(),
        }),
        extras: HashMap::from([("plan".to_string(), serde_json::json!("pro"))]),
    };

    let flat = flatten(&profile, "json", "|");
    assert_eq!(flat["name"], Value::from("Jane"));
    assert_eq!(flat["mail"], Value::from("jane@example.com"));
    assert!(!flat.contains_key("password"));
    assert!(!flat.contains_key("internal"));
    assert_eq!(flat["age"], Int::new(30).to_value());
    assert_eq!(flat["Inner.value"], Value::Int(5));
    assert_eq!(flat["zip"], Value::from("12345"));
    assert_eq!(flat["Address.city"], Value::from("Dhaka"));
    assert_eq!(flat["plan"], Value::from("pro"));

    let flat = flatten(&profile, "form", "|");
    assert_eq!(flat["full_name"], Value::from("Jane"));
    assert_eq!(flat["email"], Value::from("jane@example.com"));
}

#[test]
fn nested_member_is_validated() {
    let validator = Validator::with_registry(
        Options::new(rule_table! { "Inner.value" => ["required", "min:10"] }),
        registry(),
    );
    let mut profile = Profile::default();
    let report = validator
        .validate_json(br#"{"name": "x", "mail": "a@b.co", "inner": {"value": 5}}"#, &mut profile)
        .unwrap();
    assert_eq!(
        report.messages("Inner.value"),
        vec!["The Inner.value field value can not be less than 10"]
    );
}

#[test]
fn missing_nested_optional_record_is_skipped() {
    let validator = Validator::with_registry(
        Options::new(rule_table! { "zip" => ["digits:5"], "Address.city" => ["alpha"] }),
        registry(),
    );
    let report = validator.validate_struct(&Profile::default()).unwrap();
    assert!(report.is_empty());
}

#[test]
fn nullable_presence_decides_required() {
    let validator = Validator::with_registry(
        Options::new(rule_table! { "age" => ["required"] }),
        registry(),
    );

    let mut profile = Profile::default();
    let report = validator.validate_json(br#"{"age": 0}"#, &mut profile).unwrap();
    assert!(report.is_empty());

    let report = validator.validate_json(br#"{"age": null}"#, &mut profile).unwrap();
    assert_eq!(report.messages("age"), vec!["The age field is required"]);

    let report = validator.validate_json(br#"{"name": "x"}"#, &mut profile).unwrap();
    assert_eq!(report.len(), 1);
}

#[derive(Debug, Default, Deserialize, Record)]
#[field(crate = "fieldcheck_validate")]
struct Counter {
    count: Int64,
}

fn over9000(input: &RuleInput<'_>) -> RuleResult {
    let n = input.value.as_i64().unwrap_or_default();
    input.check(n > 9000, || "The number must be over 9000".to_string())
}

#[test]
fn custom_rule_runs_like_a_builtin() {
    let mut registry = RuleRegistry::with_defaults();
    registry.register("over9000", over9000).unwrap();
    assert!(matches!(
        registry.register("over9000", over9000),
        Err(ConfigError::DuplicateRule(_))
    ));

    let validator = Validator::with_registry(
        Options::new(rule_table! { "count" => ["required", "over9000"] }),
        Arc::new(registry),
    );

    let report = validator
        .validate_struct(&Counter {
            count: Int64::new(9001),
        })
        .unwrap();
    assert!(report.is_empty());

    let report = validator
        .validate_struct(&Counter {
            count: Int64::new(42),
        })
        .unwrap();
    assert_eq!(report.messages("count"), vec!["The number must be over 9000"]);
}

#[test]
fn decode_errors_are_reported() {
    let validator = Validator::with_registry(
        Options::new(rule_table! { "name" => ["required"] }),
        registry(),
    );
    let mut profile = Profile::default();
    let report = validator
        .validate_json(br#"{"name": 42}"#, &mut profile)
        .unwrap();
    assert_eq!(report.field_names(), vec!["_error"]);
}
