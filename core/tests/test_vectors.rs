//! Verify response decomposition against JSON test vectors stored in `test-vectors/`.
//!
//! Each case pairs raw transport output and a captured request header block
//! with the headers, request headers and body the decomposer must produce.
//! Header maps are compared as JSON objects, so ordering does not matter here.

use curlish_core::{RequestInfo, Response, REQUEST_HEADER};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Vectors {
    cases: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    raw: String,
    request_header: String,
    expected_headers: Value,
    expected_request_headers: Value,
    expected_body: String,
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Vectors = serde_json::from_str(raw).unwrap();
    assert!(!vectors.cases.is_empty());

    for case in vectors.cases {
        let name = &case.name;
        let mut info = RequestInfo::new();
        info.insert(REQUEST_HEADER.to_string(), Value::from(case.request_header));

        let response = Response::parse(case.raw.as_bytes(), info).unwrap();

        let headers = serde_json::to_value(response.headers()).unwrap();
        assert_eq!(headers, case.expected_headers, "{name}: headers");

        let request_headers = serde_json::to_value(response.request_headers()).unwrap();
        assert_eq!(request_headers, case.expected_request_headers, "{name}: request headers");

        assert_eq!(response.text(), case.expected_body, "{name}: body");
        assert_eq!(response.to_string(), case.expected_body, "{name}: display");
    }
}
