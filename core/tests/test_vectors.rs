//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use std::sync::Arc;

use mno_core::{
    ApiPreset, BasicAuthSigner, HttpMethod, HttpRequest, HttpResponse, MnoError, Params,
    PresetClient, Resource,
};
use serde::Deserialize;
use serde_json::Value;

const HOST: &str = "http://localhost:3000";

#[derive(Debug, Deserialize, PartialEq)]
struct Company {
    id: String,
    name: String,
    #[serde(skip)]
    preset: Option<String>,
}

impl Resource for Company {
    fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    fn assign_preset(&mut self, preset: &str) {
        self.preset = Some(preset.to_string());
    }
}

fn client(preset: &str) -> PresetClient {
    PresetClient::new(
        preset,
        ApiPreset::new(HOST, "/api/v1/", format!("{preset}-id"), "secret"),
        Arc::new(BasicAuthSigner),
    )
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Params {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap(), pair[1].as_str().unwrap())
        })
        .collect()
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{HOST}{}", expected["url"].as_str().unwrap()), "{name}: url");
    assert!(
        req.header("authorization").is_some_and(|v| v.starts_with("Basic ")),
        "{name}: request is signed"
    );
}

fn check_error(name: &str, err: &MnoError, expected: &Value) {
    let status = expected["status"].as_u64().map(|s| s as u16);
    match (expected["error"].as_str().unwrap(), err) {
        ("api", MnoError::Api { status: got, errors }) => {
            assert_eq!(Some(*got), status, "{name}: status");
            assert!(!errors.is_empty(), "{name}: error details");
        }
        ("unexpected_status", MnoError::UnexpectedStatus { status: got, .. }) => {
            assert_eq!(Some(*got), status, "{name}: status");
        }
        ("decoding", MnoError::Decoding(_)) => {}
        (kind, other) => panic!("{name}: expected {kind} error, got {other:?}"),
    }
}

fn expected_company(value: &Value) -> (String, String) {
    (
        value["id"].as_str().unwrap().to_string(),
        value["name"].as_str().unwrap().to_string(),
    )
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let preset = case["preset"].as_str().unwrap();
        let c = client(preset);

        let req = c
            .build_list(case["path"].as_str().unwrap(), pairs(&case["filters"]))
            .unwrap();
        check_request(name, &req, &case["expected_request"]);
        assert_eq!(
            req.query,
            pairs(&case["expected_request"]["query"]).into_vec(),
            "{name}: query"
        );

        let result = c.parse_collection::<Company>(&simulated(case));
        let expected = &case["expected_result"];
        match (expected.get("ok"), result) {
            (Some(ok), Ok(companies)) => {
                let want: Vec<_> = ok.as_array().unwrap().iter().map(expected_company).collect();
                let got: Vec<_> = companies.iter().map(|c| (c.id.clone(), c.name.clone())).collect();
                assert_eq!(got, want, "{name}: parsed result");
                assert!(companies.iter().all(|c| c.preset() == Some(preset)), "{name}: stamped");
            }
            (None, Err(err)) => check_error(name, &err, expected),
            (_, other) => panic!("{name}: unexpected outcome {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Retrieve / delete
// ---------------------------------------------------------------------------

#[test]
fn single_test_vectors() {
    let raw = include_str!("../../test-vectors/single.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let preset = case["preset"].as_str().unwrap();
        let path = case["path"].as_str().unwrap();
        let id = case["id"].as_str().unwrap();
        let c = client(preset);

        let req = match case["operation"].as_str().unwrap() {
            "retrieve" => c.build_retrieve(path, id),
            "delete" => c.build_delete(path, id),
            other => panic!("{name}: unknown operation {other}"),
        };
        check_request(name, &req, &case["expected_request"]);
        assert!(req.query.is_empty(), "{name}: no query");
        assert!(req.body.is_none(), "{name}: no body");

        let result = c.parse_single::<Company>(&simulated(case));
        let expected = &case["expected_result"];
        match (expected.get("ok"), result) {
            (Some(ok), Ok(company)) => {
                assert_eq!((company.id.clone(), company.name.clone()), expected_company(ok), "{name}");
                assert_eq!(company.preset(), Some(preset), "{name}: stamped");
            }
            (None, Err(err)) => check_error(name, &err, expected),
            (_, other) => panic!("{name}: unexpected outcome {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let preset = case["preset"].as_str().unwrap();
        let c = client(preset);
        let expected_req = &case["expected_request"];

        let req = c
            .build_create(case["path"].as_str().unwrap(), pairs(&case["parameters"]))
            .unwrap();
        check_request(name, &req, expected_req);
        for header in expected_req["headers"].as_array().unwrap() {
            let header = header.as_array().unwrap();
            assert_eq!(
                req.header(header[0].as_str().unwrap()),
                header[1].as_str(),
                "{name}: header {}",
                header[0]
            );
        }
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, expected_req["body"], "{name}: body");

        let result = c.parse_single::<Company>(&simulated(case));
        let expected = &case["expected_result"];
        match (expected.get("ok"), result) {
            (Some(ok), Ok(company)) => {
                assert_eq!((company.id.clone(), company.name.clone()), expected_company(ok), "{name}");
                assert_eq!(company.preset(), Some(preset), "{name}: stamped");
            }
            (None, Err(err)) => check_error(name, &err, expected),
            (_, other) => panic!("{name}: unexpected outcome {other:?}"),
        }
    }
}
