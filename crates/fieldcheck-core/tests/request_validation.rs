use bytes::Bytes;
use fieldcheck_core::{ensure_valid, validate_request, ApiError, Request};
use fieldcheck_validate::{rule_table, Options, RuleRegistry, Validator};
use http::{Method, StatusCode};
use http_body_util::Full;
use proptest::prelude::*;
use std::sync::Arc;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H'];

fn validator(options: Options) -> Validator {
    Validator::with_registry(options, Arc::new(RuleRegistry::with_defaults()))
}

fn upload_body(boundary: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"username\"\r\n\r\njohn_doe\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{f}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        b = boundary,
        f = file_name
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn multipart_upload_end_to_end() {
    let http_req = http::Request::builder()
        .method(Method::POST)
        .uri("/profile")
        .header("content-type", "multipart/form-data; boundary=XXX")
        .body(Full::new(Bytes::from(upload_body("XXX", "avatar.png", PNG))))
        .unwrap();
    let mut req = Request::from_http(http_req, 1 << 20).await.unwrap();

    let v = validator(
        Options::new(rule_table! {
            "username" => ["required", "alpha_dash", "between:3,16"],
            "file:photo" => ["required", "ext:png,jpg", "mime:image/png,image/jpeg", "size:1024"],
        })
        .with_messages(rule_table! { "file:photo" => ["ext:Only images"] }),
    );

    let report = validate_request(&v, &mut req).unwrap();
    assert!(report.is_empty(), "unexpected failures: {:?}", report);
}

#[test]
fn disguised_upload_is_caught_by_sniffing() {
    let req_body = upload_body("XXX", "avatar.png", b"#!/bin/sh\necho hi\n");
    let mut req = Request::builder()
        .method(Method::POST)
        .content_type("multipart/form-data; boundary=XXX")
        .body(req_body)
        .build()
        .unwrap();

    let v = validator(Options::new(rule_table! {
        "file:photo" => ["ext:png", "mime:image/png"],
    }));
    let report = validate_request(&v, &mut req).unwrap();
    assert_eq!(report.get("photo").unwrap()[0].code, "mime");

    let err: ApiError = ensure_valid(report).unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["type"], "validation_error");
    assert_eq!(body["error"]["fields"][0]["field"], "photo");
}

#[test]
fn missing_required_upload() {
    let mut req = Request::builder()
        .method(Method::POST)
        .content_type("application/x-www-form-urlencoded")
        .body("username=jane")
        .build()
        .unwrap();
    let v = validator(Options::new(rule_table! { "file:photo" => ["required"] }));
    let report = validate_request(&v, &mut req).unwrap();
    assert_eq!(report.messages("photo"), vec!["The photo field is required"]);
}

#[test]
fn html_upload_passes_html_mime_rule() {
    let page = b"<!DOCTYPE html>\n<html><head><title>cv</title></head></html>\n";
    let mut req = Request::builder()
        .method(Method::POST)
        .content_type("multipart/form-data; boundary=XXX")
        .body(upload_body("XXX", "cv.html", page))
        .build()
        .unwrap();

    let v = validator(Options::new(rule_table! {
        "file:photo" => ["required", "ext:html", "mime:text/html"],
    }));
    let report = validate_request(&v, &mut req).unwrap();
    assert!(report.is_empty(), "unexpected failures: {:?}", report);
}

#[test]
fn form_is_still_readable_after_payload_too_large() {
    let mut req = Request::builder()
        .method(Method::POST)
        .content_type("application/x-www-form-urlencoded")
        .body("username=jane_doe_the_third")
        .build()
        .unwrap();

    let err = req.parse_form(8).unwrap_err();
    assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);

    let v = validator(Options::new(rule_table! {
        "username" => ["required", "alpha_dash"],
    }));
    let report = validate_request(&v, &mut req).unwrap();
    assert!(report.is_empty(), "unexpected failures: {:?}", report);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Urlencoded values reach the rules exactly as the client sent them.
    #[test]
    fn urlencoded_values_reach_the_validator(value in "[a-zA-Z0-9_.@-]{1,24}") {
        let encoded = serde_urlencoded::to_string([("v", value.as_str())]).unwrap();
        let mut req = Request::builder()
            .method(Method::POST)
            .content_type("application/x-www-form-urlencoded")
            .body(encoded)
            .build()
            .unwrap();
        let v = validator(Options::new(rule_table! {
            "v" => ["required", format!("in:{}", value), format!("not_in:{}!", value)]
        }));
        let report = validate_request(&v, &mut req).unwrap();
        prop_assert!(report.is_empty());
    }
}
