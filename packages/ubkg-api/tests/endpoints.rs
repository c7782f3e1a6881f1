//! Integration test: the full HTTP pipeline against an in-memory backend.
//!
//! Each test builds the router over a fake `CypherBackend` that answers by
//! template name and records the query text it was given, then drives one
//! request through `tower::ServiceExt::oneshot`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use ubkg_api::cypher::{QueryRequest, TemplateStore};
use ubkg_api::executor::{BackendError, CypherBackend, TRANSACTION_TIMEOUT_CODE};
use ubkg_api::graph::{GraphValue, NativeNode, NativePath, NativeRelationship, Record};
use ubkg_api::response::ResponseAssembler;
use ubkg_api::{router, AppState, DatabaseInfo, UbkgClient};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeBackend {
    responses: HashMap<&'static str, Result<Vec<Record>, BackendError>>,
    seen: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    fn answering(mut self, template: &'static str, records: Vec<Record>) -> Self {
        self.responses.insert(template, Ok(records));
        self
    }

    fn failing(mut self, template: &'static str, err: BackendError) -> Self {
        self.responses.insert(template, Err(err));
        self
    }

    /// Query text rendered for `template`, if it ran.
    fn text_of(&self, template: &str) -> Option<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == template)
            .map(|(_, text)| text.clone())
    }

    fn ran_anything(&self) -> bool {
        !self.seen.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl CypherBackend for FakeBackend {
    async fn run(&self, request: &QueryRequest) -> Result<Vec<Record>, BackendError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.template.to_string(), request.text.clone()));
        self.responses
            .get(request.template)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

struct Harness {
    backend: Arc<FakeBackend>,
    version: &'static str,
    threshold: u64,
    base_dir: PathBuf,
}

impl Harness {
    fn new(backend: FakeBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            version: "5.20.0",
            threshold: 0,
            base_dir: PathBuf::from("."),
        }
    }

    fn app(&self) -> Router {
        let database = DatabaseInfo {
            name: "Neo4j Kernel".to_string(),
            version: self.version.to_string(),
            edition: "community".to_string(),
        };
        let client = UbkgClient::new(self.backend.clone(), TemplateStore::builtin(), 2000, database);
        let assembler = ResponseAssembler::new(self.threshold, None, 2000);
        router(AppState::new(Arc::new(client), assembler, self.base_dir.clone()))
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }));
        (status, body)
    }
}

fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}

fn map(entries: Vec<(&str, GraphValue)>) -> GraphValue {
    GraphValue::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn concept(id: i64, cui: &str) -> NativeNode {
    NativeNode {
        id,
        element_id: Some(format!("4:0c7e:{id}")),
        labels: vec!["Concept".to_string()],
        properties: vec![("CUI".to_string(), cui.into())],
    }
}

fn isa(id: i64, start: i64, end: i64) -> NativeRelationship {
    NativeRelationship {
        id,
        element_id: Some(format!("5:0c7e:{id}")),
        start_id: start,
        start_element_id: Some(format!("4:0c7e:{start}")),
        end_id: end,
        end_element_id: Some(format!("4:0c7e:{end}")),
        rel_type: "isa".to_string(),
        properties: vec![("SAB".to_string(), "UBERON".into())],
    }
}

fn one_hop_graph() -> Record {
    let path = NativePath {
        nodes: vec![concept(10, "C0001"), concept(11, "C0002")],
        relationships: vec![isa(70, 10, 11)],
    };
    Record::new().with(
        "graph",
        map(vec![
            ("nodes", GraphValue::List(vec![map(vec![("id", "C0001".into())])])),
            ("paths", GraphValue::List(vec![GraphValue::Path(path)])),
            ("edges", GraphValue::List(Vec::new())),
        ]),
    )
}

// ---------------------------------------------------------------------------
// Parameter validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_parameter_is_rejected_before_querying() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/codes/HGNC:1/codes?foo=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        message(&body).starts_with("Invalid query parameter: 'foo'. The possible parameter name is: 'sab'."),
        "{body}"
    );
    assert!(!harness.backend.ran_anything());
}

#[tokio::test]
async fn test_endpoint_without_parameters_rejects_any() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/property-types?x=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("does not take query parameters"), "{body}");
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/concepts/C0001/paths/expand?sab=UBERON&rel=isa").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).starts_with("Missing query parameter: 'maxdepth'."), "{body}");
}

#[tokio::test]
async fn test_depth_order_checked_before_clamp() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness
        .get("/concepts/C0001/paths/expand?sab=UBERON&rel=isa&mindepth=3&maxdepth=2")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        message(&body).starts_with("Invalid parameter values: 'mindepth' (3) greater than 'maxdepth' (2)."),
        "{body}"
    );
}

#[tokio::test]
async fn test_negative_skip_rejected() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/semantics/semantic-types?skip=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message(&body),
        "Invalid value (-1) for parameter 'skip'. The parameter cannot be negative."
    );
}

#[tokio::test]
async fn test_tree_mindepth_bound() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness
        .get("/concepts/C0001/paths/trees?sab=UBERON&rel=isa&mindepth=2&maxdepth=3")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("can be either 0 or 1"), "{body}");
}

#[tokio::test]
async fn test_sources_context_enum_is_case_insensitive() {
    let backend = FakeBackend::default().answering(
        "sources",
        vec![Record::new().with(
            "response",
            map(vec![(
                "sources",
                GraphValue::List(vec![map(vec![("sab", "UBERON".into())])]),
            )]),
        )],
    );
    let harness = Harness::new(backend);

    let (status, body) = harness.get("/sources?context=BASE_CONTEXT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"sources": [{"sab": "UBERON"}]}));
    let text = harness.backend.text_of("sources").unwrap();
    assert!(text.contains("AND tContext.name IN ['base_context']"), "{text}");

    let (status, body) = harness.get("/sources?context=nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).starts_with("Invalid value for parameter: 'context' ('nope')."), "{body}");
}

// ---------------------------------------------------------------------------
// Flat results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_code_codes_with_sab_list() {
    let backend = FakeBackend::default().answering(
        "codes_code_id_codes",
        vec![
            Record::new()
                .with("concept", "C0006142")
                .with("code", "SNOMEDCT_US:254837009")
                .with("sab", "SNOMEDCT_US"),
            // missing column: dropped
            Record::new().with("concept", "C0006142"),
        ],
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/codes/HGNC:1100/codes?sab=SNOMEDCT_US,NCI").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"concept": "C0006142", "code": "SNOMEDCT_US:254837009", "SAB": "SNOMEDCT_US"}])
    );
    let text = harness.backend.text_of("codes_code_id_codes").unwrap();
    assert!(text.contains("'HGNC:1100'"), "{text}");
    assert!(text.contains("AND c.SAB IN ['SNOMEDCT_US', 'NCI']"), "{text}");
}

#[tokio::test]
async fn test_term_codes_quote_the_term() {
    let backend = FakeBackend::default().answering(
        "terms_term_id_codes",
        vec![Record::new().with("termtype", "PT").with("code", "NCI:C4872")],
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/terms/breast%20cancer/codes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"termtype": "PT", "code": "NCI:C4872"}]));
    let text = harness.backend.text_of("terms_term_id_codes").unwrap();
    assert!(text.contains("\"breast cancer\""), "{text}");

    let (status, body) = Harness::new(FakeBackend::default()).get("/terms/nothing/concepts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(message(&body).starts_with("No Concepts with preferred terms"), "{body}");
}

#[tokio::test]
async fn test_semantic_type_positions_follow_skip() {
    let backend = FakeBackend::default().answering(
        "semantics_semantic_types",
        vec![
            Record::new().with("semantic_type", map(vec![("STN", "A1.2".into())])),
            Record::new().with("semantic_type", map(vec![("STN", "A1.2.1".into())])),
        ],
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/semantics/semantic-types?skip=10&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    let types = body["semantic_types"].as_array().unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types[0]["position"], 11);
    assert_eq!(types[1]["position"], 12);
    assert_eq!(types[0]["semantic_type"], json!({"STN": "A1.2"}));
}

#[tokio::test]
async fn test_nodeobjects_prunes_null_placeholders() {
    let node = map(vec![
        ("concept", "C0001".into()),
        (
            "semantic_types",
            GraphValue::List(vec![
                map(vec![("name", GraphValue::Null), ("STN", GraphValue::Null)]),
                map(vec![("name", "Cell".into()), ("STN", "A1.1".into())]),
            ]),
        ),
    ]);
    let backend = FakeBackend::default().answering("concepts_nodes", vec![Record::new().with("nodeobject", node)]);
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/concepts/C0001/nodeobjects").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"nodeobjects": [{"concept": "C0001", "semantic_types": [{"name": "Cell", "STN": "A1.1"}]}]})
    );
}

#[tokio::test]
async fn test_node_type_counts_zero_total_is_not_found() {
    let backend = FakeBackend::default().answering(
        "node_types_counts",
        vec![Record::new().with(
            "output",
            map(vec![(
                "node_types",
                GraphValue::List(vec![map(vec![
                    ("node_type", "Nope".into()),
                    ("count", GraphValue::Integer(0)),
                ])]),
            )]),
        )],
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/node-types/Nope/counts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(message(&body).starts_with("No Node Types for node_type='Nope'"), "{body}");
}

// ---------------------------------------------------------------------------
// Graph results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_expand_returns_translated_graph() {
    let backend = FakeBackend::default().answering("concepts_expand", vec![one_hop_graph()]);
    let harness = Harness::new(backend);
    let (status, body) = harness
        .get("/concepts/C0001/paths/expand?sab=UBERON&rel=isa&maxdepth=9")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"], json!([{"id": "C0001"}]));
    assert_eq!(body["edges"], json!([]));
    let path = &body["paths"][0];
    assert_eq!(path["length"], 1.0);
    assert_eq!(path["start"]["identity"], 10);
    assert_eq!(path["end"]["properties"], json!([{"CUI": "C0002"}]));
    let rel = &path["segments"][0]["relationship"];
    assert_eq!(rel["type"], "isa");
    assert_eq!(rel["start"], 10);
    assert_eq!(rel["endNodeElementId"], "11");

    // maxdepth 9 clamps to the default mindepth 1 plus 2
    let text = harness.backend.text_of("concepts_expand").unwrap();
    assert!(text.contains("minLevel: 1"), "{text}");
    assert!(text.contains("maxLevel: 3"), "{text}");
}

#[tokio::test]
async fn test_sequential_uppercases_sabs() {
    let backend = FakeBackend::default().answering("concepts_subgraph_sequential", vec![one_hop_graph()]);
    let harness = Harness::new(backend);
    let (status, _) = harness
        .get("/concepts/C0001/paths/subgraph/sequential?relsequence=uberon:isa,pato:has_part")
        .await;

    assert_eq!(status, StatusCode::OK);
    let text = harness.backend.text_of("concepts_subgraph_sequential").unwrap();
    assert!(text.contains(r#"["isa", "has_part"]"#), "{text}");
    assert!(text.contains(r#"["UBERON", "PATO"]"#), "{text}");
    assert!(text.contains("[*2]"), "{text}");
    assert!(text.contains("AND start.CUI IN ['C0001']"), "{text}");
}

#[tokio::test]
async fn test_sequential_without_start_not_found() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness
        .get("/concepts/paths/subgraph/sequential?relsequence=UBERON:isa")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        message(&body).starts_with(
            "No sequential paths found starting for any concept with sequential relationships 'UBERON:isa'"
        ),
        "{body}"
    );
}

#[tokio::test]
async fn test_malformed_relsequence_entry() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/concepts/paths/subgraph/sequential?relsequence=isa").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message(&body),
        "Invalid parameter value for 'relsequence': isa. Format relationships as <SAB>:<relationship_type>"
    );
}

#[tokio::test]
async fn test_subgraph_version_gate_runs_first() {
    let mut harness = Harness::new(FakeBackend::default());
    harness.version = "5.3.0";
    let (status, body) = harness.get("/concepts/paths/subgraph?bogus=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "This functionality requires at least version 5.11.0 of neo4j.");
    assert!(!harness.backend.ran_anything());
}

// ---------------------------------------------------------------------------
// Errors and responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_empty_result_404_names_path_and_timeout() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/codes/HGNC:1/concepts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let msg = message(&body);
    assert!(msg.starts_with("No Concepts linked to the Code specified"), "{msg}");
    assert!(msg.contains("query path '/codes/HGNC:1/concepts'"), "{msg}");
    assert!(msg.ends_with("the timeout of 2 seconds."), "{msg}");
}

#[tokio::test]
async fn test_engine_timeout_is_504() {
    let backend = FakeBackend::default().failing(
        "concepts_concept_id_definitions",
        BackendError::with_code(TRANSACTION_TIMEOUT_CODE, "transaction timed out"),
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/concepts/C0001/definitions").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        message(&body),
        "The query runtime exceeded the specified timeout of 2 seconds."
    );
}

#[tokio::test]
async fn test_other_backend_error_is_500() {
    let backend = FakeBackend::default().failing(
        "relationship_types",
        BackendError::with_code("Neo.ClientError.Statement.SyntaxError", "boom"),
    );
    let harness = Harness::new(backend);
    let (status, body) = harness.get("/relationship-types").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Query error: boom");
}

#[tokio::test]
async fn test_oversized_response_without_stash_is_403() {
    let backend = FakeBackend::default().answering(
        "sabs",
        vec![Record::new().with(
            "sabs",
            GraphValue::List(vec!["HGNC".into(), "UBERON".into(), "SNOMEDCT_US".into()]),
        )],
    );
    let mut harness = Harness::new(backend);
    harness.threshold = 10;
    let (status, body) = harness.get("/sabs").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(message(&body).contains("exceeds the payload limit of 10 bytes"), "{body}");
}

#[tokio::test]
async fn test_fixed_refusals() {
    let harness = Harness::new(FakeBackend::default());

    let (status, body) = harness.get("/node-types/counts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        message(&body).starts_with("The response to this endpoint is likely to exceed the timeout of 2 seconds"),
        "{body}"
    );

    let (status, body) = harness.get("/sabs/codes/details").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("memory limitations"), "{body}");

    let (status, _) = harness.get("/sabs/term-types").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!harness.backend.ran_anything());
}

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_index_greeting() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw"], "Hello! This is UBKG-API service :)");
}

#[tokio::test]
async fn test_database_server() {
    let harness = Harness::new(FakeBackend::default());
    let (status, body) = harness.get("/database/server").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"version": "5.20.0", "edition": "community"}));
}

#[tokio::test]
async fn test_status_reports_connection_and_build() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("VERSION"), "2.1.0\n").unwrap();
    std::fs::write(dir.path().join("BUILD"), "abc123\n").unwrap();

    let backend = FakeBackend::default().answering(
        "check_connection",
        vec![Record::new().with("result", GraphValue::Integer(1))],
    );
    let mut harness = Harness::new(backend);
    harness.base_dir = dir.path().to_path_buf();

    let (status, body) = harness.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "2.1.0");
    assert_eq!(body["build"], "abc123");
    assert_eq!(body["neo4j_connection"], true);
    assert_eq!(body["open_sessions"], 0);
    assert_eq!(body["query_stats"]["query_count"], 1);
}
