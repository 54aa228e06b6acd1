//! Verify `ApiClient::build` and `ApiClient::parse` against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Bodies and envelopes are compared as parsed JSON, not raw strings, so
//! field ordering never causes false negatives.

use api_client::{ApiClient, CredentialMode, Envelope, HttpMethod, HttpResponse, Query};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn headers_of(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected = &case["expected_request"];

        let mode: CredentialMode = match input.get("credential_mode") {
            Some(mode) => serde_json::from_value(mode.clone()).unwrap(),
            None => CredentialMode::Bearer,
        };
        let client = ApiClient::new(base_url).with_credential_mode(mode);
        let query: Option<Query> = input
            .get("query")
            .map(|q| q.as_object().unwrap().clone());

        let req = client.build(
            parse_method(input["method"].as_str().unwrap()),
            input["path"].as_str().unwrap(),
            query.as_ref(),
            input.get("body"),
            input.get("token").and_then(Value::as_str),
        );

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(
            req.url,
            format!("{base_url}{}", expected["path"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(req.headers, headers_of(&expected["headers"]), "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let sent: Value = serde_json::from_str(body).unwrap();
                assert_eq!(sent, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let client = ApiClient::new("http://localhost:8080");
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );

        let envelope = client.parse(response);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            case["expected_envelope"],
            "{name}: envelope"
        );

        let expected: Envelope = serde_json::from_value(case["expected_envelope"].clone()).unwrap();
        assert_eq!(envelope, expected, "{name}: typed envelope");
    }
}
