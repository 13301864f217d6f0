//! Validation engine benchmarks
//!
//! Measures flattening, single-rule dispatch and full record validation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldcheck::prelude::*;
use fieldcheck::{flatten, RuleRegistry};
use std::sync::Arc;

#[derive(Default, Deserialize, Record)]
#[serde(default)]
struct Address {
    #[field(json = "zip")]
    zip: String,
    #[field(json = "city")]
    city: String,
}

#[derive(Default, Deserialize, Record)]
#[serde(default)]
struct Signup {
    #[field(json = "email")]
    email: String,
    #[field(json = "username")]
    username: String,
    #[field(json = "age")]
    age: Int,
    #[field(json = "website")]
    website: String,
    address: Address,
}

fn signup() -> Signup {
    Signup {
        email: "jane@example.com".into(),
        username: "jane_doe".into(),
        age: Int::new(30),
        website: "https://example.com/jane".into(),
        address: Address {
            zip: "12345".into(),
            city: "Springfield".into(),
        },
    }
}

fn validator(rules: RuleTable) -> Validator {
    Validator::with_registry(Options::new(rules), Arc::new(RuleRegistry::with_defaults()))
}

/// Benchmark flattening of records and maps
fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    let record = signup();
    group.bench_function("nested_record", |b| {
        b.iter(|| flatten(black_box(&record), "json", "|"))
    });

    let object = serde_json::json!({
        "email": "jane@example.com",
        "profile": {"username": "jane_doe", "age": 30},
        "tags": ["a", "b", "c"],
    });
    group.bench_function("json_object", |b| {
        b.iter(|| flatten(black_box(&object), "json", "|"))
    });

    group.finish();
}

/// Benchmark a single rule against a passing value
fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");

    let cases = [
        ("required", "value"),
        ("email", "jane@example.com"),
        ("url", "https://example.com/a/b?c=d"),
        ("between:3,16", "jane_doe"),
        ("numeric_between:18,60", "30"),
        ("uuid_v4", "550e8400-e29b-41d4-a716-446655440000"),
        ("regex:^[a-z_]+$", "jane_doe"),
    ];

    for (rule, value) in cases {
        let v = validator(rule_table! { "field" => [rule] });
        let data = serde_json::json!({ "field": value });
        group.bench_with_input(BenchmarkId::new("rule", rule), &data, |b, data| {
            b.iter(|| v.validate_struct(black_box(data)))
        });
    }

    group.finish();
}

/// Benchmark full record validation, passing and failing
fn bench_validate_struct(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_struct");

    let v = validator(rule_table! {
        "email" => ["required", "email"],
        "username" => ["required", "alpha_dash", "between:3,16"],
        "age" => ["required", "numeric_between:18,60"],
        "website" => ["url"],
        "zip" => ["digits:5"],
        "city" => ["alpha_space"],
    });

    let valid = signup();
    group.bench_function("valid", |b| b.iter(|| v.validate_struct(black_box(&valid))));

    let invalid = Signup {
        email: "nope".into(),
        username: "x".into(),
        age: Int::new(12),
        ..signup()
    };
    group.bench_function("invalid", |b| {
        b.iter(|| v.validate_struct(black_box(&invalid)))
    });

    let body = serde_json::to_vec(&serde_json::json!({
        "email": "jane@example.com",
        "username": "jane_doe",
        "age": 30,
        "website": "https://example.com",
        "address": {"zip": "12345", "city": "Springfield"}
    }))
    .unwrap_or_default();
    group.bench_function("json_decode_and_validate", |b| {
        b.iter(|| {
            let mut target = Signup::default();
            v.validate_json(black_box(&body), &mut target)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_flatten, bench_rules, bench_validate_struct);
criterion_main!(benches);
