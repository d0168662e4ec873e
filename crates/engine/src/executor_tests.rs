//! Tests for the node execution engine.
//!
//! Loop behaviour is exercised with `MockNode` over a `MockApi` connection.
//! The end-to-end cases at the bottom run real nodes through the HTTP
//! gateway against a `wiremock` server.

use std::sync::Arc;

use api::mock::MockApi;
use api::{ClientConfig, Credential};
use nodes::mock::MockNode;
use nodes::traits::InputItem;
use nodes::ShortLinkNode;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{EngineError, ExecutorConfig, NodeExecutor, OutputItem};

fn executor(config: ExecutorConfig) -> NodeExecutor {
    NodeExecutor::new(Arc::new(MockApi::new()), config)
}

fn items(params: &[Value]) -> Vec<InputItem> {
    params.iter().cloned().map(InputItem::new).collect()
}

// ============================================================
// Item loop
// ============================================================

#[tokio::test]
async fn every_item_is_processed_in_order() {
    let node = MockNode::echo("mock");
    let input = items(&[json!({ "n": 0 }), json!({ "n": 1 }), json!({ "n": 2 })]);

    let result = executor(ExecutorConfig::default()).run(&node, &input).await.unwrap();

    assert_eq!(node.call_count(), 3);
    let paired: Vec<usize> = result.items.iter().map(|item| item.paired_item).collect();
    assert_eq!(paired, vec![0, 1, 2]);
    assert_eq!(result.items[2].json["params"]["n"], 2);
    assert_eq!(result.items[2].json["item"], 2);
}

#[tokio::test]
async fn empty_input_produces_no_calls() {
    let node = MockNode::echo("mock");

    let result = executor(ExecutorConfig::default()).run(&node, &[]).await.unwrap();

    assert!(result.items.is_empty());
    assert_eq!(node.call_count(), 0);
}

#[tokio::test]
async fn operation_of_first_item_is_pinned() {
    let node = MockNode::echo("mock");
    let input = items(&[
        json!({ "operation": "get", "id": "a" }),
        json!({ "operation": "delete", "id": "b" }),
        json!({ "id": "c" }),
    ]);

    executor(ExecutorConfig::default()).run(&node, &input).await.unwrap();

    let seen = node.seen();
    assert!(seen.iter().all(|params| params["operation"] == "get"));
    assert_eq!(seen[1]["id"], "b");
}

#[tokio::test]
async fn array_results_fan_out_per_element() {
    let node = MockNode::returning("mock", json!([{ "_id": "a" }, { "_id": "b" }, { "_id": "c" }]));
    let input = items(&[json!({}), json!({})]);

    let result = executor(ExecutorConfig::default()).run(&node, &input).await.unwrap();

    assert_eq!(result.items.len(), 6);
    assert_eq!(result.items[3], OutputItem::new(json!({ "_id": "a" }), 1));
}

#[tokio::test]
async fn continue_on_fail_keeps_one_output_per_input() {
    let node = MockNode::failing_on("mock", vec![1], "Short link not found");
    let input = items(&[json!({}), json!({}), json!({})]);

    let result = executor(ExecutorConfig::continue_on_fail()).run(&node, &input).await.unwrap();

    assert_eq!(node.call_count(), 3);
    assert_eq!(result.items.len(), 3);
    assert_eq!(
        result.items[1],
        OutputItem::error("Posty5 API Error: Short link not found", 1)
    );
    assert_eq!(result.errors().count(), 1);
}

#[tokio::test]
async fn failure_aborts_and_keeps_earlier_items() {
    let node = MockNode::failing_on("mock", vec![1], "boom");
    let input = items(&[json!({}), json!({}), json!({})]);

    let err = executor(ExecutorConfig::default()).run(&node, &input).await.unwrap_err();

    assert_eq!(node.call_count(), 2);
    match &err {
        EngineError::ItemFailed { node, item, emitted, .. } => {
            assert_eq!(node, "mock");
            assert_eq!(*item, 1);
            assert_eq!(emitted.len(), 1);
        }
        other => panic!("expected ItemFailed, got {other:?}"),
    }
    assert_eq!(err.message(), "Posty5 API Error: boom");
}

#[tokio::test]
async fn parameter_errors_surface_like_api_errors() {
    let api = MockApi::new();
    let executor = NodeExecutor::new(Arc::new(api.clone()), ExecutorConfig::continue_on_fail());
    let input = items(&[json!({ "operation": "get" })]);

    let result = executor.run_type("posty5ShortLink", &input).await.unwrap();

    assert!(result.items[0].is_error());
    assert!(api.calls().is_empty());
}

// ============================================================
// Registry
// ============================================================

#[test]
fn builtin_registry_has_every_node() {
    let executor = executor(ExecutorConfig::default());
    let mut names: Vec<&str> = executor.registry().keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "posty5FormSubmission",
            "posty5HtmlHosting",
            "posty5QrCode",
            "posty5ShortLink",
            "posty5SocialPublisherPost",
            "posty5SocialPublisherTask",
            "posty5SocialPublisherWorkspace",
        ]
    );
}

#[tokio::test]
async fn unknown_node_type_is_rejected() {
    let err = executor(ExecutorConfig::default())
        .run_type("posty5Nope", &items(&[json!({})]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownNodeType(name) if name == "posty5Nope"));
}

#[tokio::test]
async fn registered_nodes_replace_builtins() {
    let mut executor = executor(ExecutorConfig::default());
    executor.register(Arc::new(MockNode::returning("posty5ShortLink", json!({ "mocked": true }))));

    let result = executor
        .run_type("posty5ShortLink", &items(&[json!({ "operation": "get" })]))
        .await
        .unwrap();

    assert_eq!(result.items[0].json, json!({ "mocked": true }));
}

// ============================================================
// End to end over HTTP
// ============================================================

fn connect(server: &MockServer, config: ExecutorConfig) -> NodeExecutor {
    NodeExecutor::connect(
        Credential::new("test-api-key"),
        ClientConfig::default().with_base_url(server.uri()),
        config,
    )
    .expect("executor")
}

#[tokio::test]
async fn short_link_create_sends_minimal_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/short-link"))
        .and(header("X-API-Key", "test-api-key"))
        .and(body_json(json!({ "baseUrl": "https://example.com", "createdFrom": "n8n" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "created",
            "result": { "_id": "sl1", "shorterLink": "https://posty5.com/abc" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = connect(&server, ExecutorConfig::default())
        .run(&ShortLinkNode, &items(&[json!({ "operation": "create", "url": "https://example.com" })]))
        .await
        .unwrap();

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].json["shorterLink"], "https://posty5.com/abc");
}

#[tokio::test]
async fn from_env_sends_to_the_overridden_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/short-link/sl1"))
        .and(header("X-API-Key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "_id": "sl1" } })))
        .expect(1)
        .mount(&server)
        .await;

    std::env::set_var(api::config::BASE_URL_ENV, server.uri());
    let executor = NodeExecutor::from_env(Credential::new("test-api-key"), ExecutorConfig::default());
    std::env::remove_var(api::config::BASE_URL_ENV);

    let result = executor
        .expect("executor")
        .run_type("posty5ShortLink", &items(&[json!({ "operation": "get", "shortLinkId": "sl1" })]))
        .await
        .unwrap();

    assert_eq!(result.items[0].json, json!({ "_id": "sl1" }));
}

#[tokio::test]
async fn html_file_is_uploaded_after_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/html-hosting/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "details": { "_id": "hh1", "name": "Landing" },
                "uploadFileConfig": { "uploadUrl": format!("{}/bucket/index.html?sig=abc", server.uri()) }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/bucket/index.html"))
        .and(query_param("sig", "abc"))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let item = InputItem::new(json!({
        "operation": "createFromFile",
        "name": "Landing",
        "fileName": "index.html"
    }))
    .with_binary("data", b"<html></html>".to_vec());

    let result = connect(&server, ExecutorConfig::default())
        .run_type("posty5HtmlHosting", &[item])
        .await
        .unwrap();

    assert_eq!(result.items[0].json, json!({ "_id": "hh1", "name": "Landing" }));

    let requests = server.received_requests().await.unwrap_or_default();
    let upload = requests
        .iter()
        .find(|req| req.method.as_str() == "PUT")
        .expect("upload request");
    assert!(upload.headers.get("X-API-Key").is_none());
    assert_eq!(upload.body, b"<html></html>".to_vec());
}

#[tokio::test]
async fn list_return_all_walks_pages_over_http() {
    let server = MockServer::start().await;
    let full: Vec<Value> = (0..100).map(|n| json!({ "_id": n })).collect();
    Mock::given(method("GET"))
        .and(path("/api/qr-code"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "100"))
        .and(header_exists("X-API-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "items": full } })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/qr-code"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": { "items": [{ "_id": 100 }] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = connect(&server, ExecutorConfig::default())
        .run_type("posty5QrCode", &items(&[json!({ "operation": "list", "returnAll": true })]))
        .await
        .unwrap();

    assert_eq!(result.items.len(), 101);
    assert!(result.items.iter().all(|item| item.paired_item == 0));
}

#[tokio::test]
async fn api_errors_become_error_items_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/short-link/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Short link not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/short-link/sl1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "_id": "sl1" } })))
        .mount(&server)
        .await;

    let input = items(&[
        json!({ "operation": "get", "shortLinkId": "missing" }),
        json!({ "operation": "get", "shortLinkId": "sl1" }),
    ]);
    let result = connect(&server, ExecutorConfig::continue_on_fail())
        .run_type("posty5ShortLink", &input)
        .await
        .unwrap();

    assert_eq!(
        result.items,
        vec![
            OutputItem::error("Posty5 API Error: Short link not found", 0),
            OutputItem::new(json!({ "_id": "sl1" }), 1),
        ]
    );
}
