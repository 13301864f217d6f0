//! Form transport benchmarks
//!
//! Measures form parsing and validation of urlencoded and multipart bodies.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldcheck::prelude::*;
use fieldcheck::RuleRegistry;
use http::Method;
use std::sync::Arc;

const LIMIT: u64 = 8 * 1024 * 1024;

fn urlencoded_request(fields: usize) -> Request {
    let pairs: Vec<(String, String)> = (0..fields)
        .map(|i| (format!("field{}", i), format!("value {}", i)))
        .collect();
    let body = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    Request::builder()
        .method(Method::POST)
        .content_type("application/x-www-form-urlencoded")
        .body(body)
        .build()
        .unwrap()
}

fn multipart_request(file_size: usize) -> Request {
    let mut body = b"--bench\r\n\
        Content-Disposition: form-data; name=\"username\"\r\n\r\n\
        jane_doe\r\n\
        --bench\r\n\
        Content-Disposition: form-data; name=\"upload\"; filename=\"data.bin\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n"
        .to_vec();
    body.extend(std::iter::repeat(0xA5u8).take(file_size));
    body.extend_from_slice(b"\r\n--bench--\r\n");

    Request::builder()
        .method(Method::POST)
        .content_type("multipart/form-data; boundary=bench")
        .body(Bytes::from(body))
        .build()
        .unwrap()
}

/// Benchmark urlencoded parsing by field count
fn bench_urlencoded(c: &mut Criterion) {
    let mut group = c.benchmark_group("urlencoded_form");

    for fields in [1usize, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::new("fields", fields), fields, |b, &fields| {
            b.iter_batched(
                || urlencoded_request(fields),
                |mut req| {
                    let _ = black_box(req.parse_form(LIMIT).map(|form| form.values.len()));
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark multipart parsing and file rules by upload size
fn bench_multipart(c: &mut Criterion) {
    let mut group = c.benchmark_group("multipart_form");

    let v = Validator::with_registry(
        Options::new(rule_table! {
            "username" => ["required", "alpha_dash"],
            "file:upload" => ["required", "ext:bin", "size:4194304"],
        }),
        Arc::new(RuleRegistry::with_defaults()),
    );

    for size in [1024usize, 64 * 1024, 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::new("upload_bytes", size), size, |b, &size| {
            b.iter_batched(
                || multipart_request(size),
                |mut req| {
                    let _ = black_box(validate_request(&v, &mut req));
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_urlencoded, bench_multipart);
criterion_main!(benches);
