//! End-to-end tests over a real loopback listener.

mod common;

use common::{FakeHost, build_server, http, rpc, test_config};
use serde_json::{Value, json};
use std::sync::Arc;

#[tokio::test]
async fn health_check() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = http(addr, "GET", "/", "").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));

    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "devtools-mcp-test");
    assert_eq!(body["version"], "0.0.1");
    assert_eq!(body["protocol"], "MCP over HTTP");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = http(addr, "POST", "/", "{not json").await;
    assert_eq!(response.status, 200);
    assert!(
        response
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("application/json"))
    );

    let body = response.json();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["error"]["code"], -32700);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn preflight_returns_empty_ok() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = http(addr, "OPTIONS", "/", "").await;
    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let init = rpc(addr, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["capabilities"], json!({"tools": {}}));
    assert_eq!(init["result"]["serverInfo"]["name"], "devtools-mcp-test");

    let list = |id: i64| rpc(addr, json!({"jsonrpc": "2.0", "id": id, "method": "tools/list"}));
    let first = list(2).await;
    let second = list(3).await;

    let names: Vec<_> = first["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "evaluate_code",
            "get_store",
            "call_store_method",
            "find_module",
            "search_variables",
            "inspect_element",
        ]
    );
    assert_eq!(first["result"], second["result"]);
    assert!(first["result"]["tools"][0]["inputSchema"].is_object());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn inspect_missing_element() {
    let (server, state) = build_server(test_config());
    state.bridge.attach_context(Arc::new(FakeHost::default()));
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "inspect_element", "arguments": {"selector": "#nonexistent"}}
        }),
    )
    .await;

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["content"][0]["type"], "text");
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("\"found\": false"), "{}", text);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn string_results_are_verbatim() {
    let (server, state) = build_server(test_config());
    state.bridge.attach_context(Arc::new(FakeHost::default()));
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": "title",
            "method": "tools/call",
            "params": {"name": "evaluate_code", "arguments": {"code": "document.title"}}
        }),
    )
    .await;

    assert_eq!(response["id"], "title");
    assert_eq!(response["result"]["content"][0]["text"], "Inspector");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn tool_failure_is_server_error() {
    let (server, state) = build_server(test_config());
    state.bridge.attach_context(Arc::new(FakeHost::default()));
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "evaluate_code", "arguments": {"code": "}{"}}
        }),
    )
    .await;

    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], -32000);
    assert_eq!(
        response["error"]["data"],
        "SyntaxError: Unexpected token in }{"
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn unknown_tool_has_no_side_effect() {
    let (server, state) = build_server(test_config());
    let host = Arc::new(FakeHost::default());
    state.bridge.attach_context(host.clone());
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {"name": "format_disk", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(host.calls(), 0);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn wrong_version_never_invokes_tool() {
    let (server, state) = build_server(test_config());
    let host = Arc::new(FakeHost::default());
    state.bridge.attach_context(host.clone());
    let addr = server.start(0).await.unwrap();

    for body in [
        json!({"jsonrpc": "1.0", "id": 1, "method": "tools/call",
               "params": {"name": "evaluate_code", "arguments": {"code": "document.title"}}}),
        json!({"id": 2, "method": "tools/call",
               "params": {"name": "evaluate_code", "arguments": {"code": "document.title"}}}),
    ] {
        let response = rpc(addr, body).await;
        assert_eq!(response["error"]["code"], -32600);
    }
    assert_eq!(host.calls(), 0);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn missing_execution_context_is_reported() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "get_store", "arguments": {"storeName": "UserStore"}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32000);
    assert_eq!(response["error"]["data"], "No execution context available");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn hung_tool_times_out_without_blocking_others() {
    let (server, state) = build_server(test_config());
    state.bridge.attach_context(Arc::new(FakeHost::default()));
    let addr = server.start(0).await.unwrap();

    let hung = tokio::spawn(rpc(
        addr,
        json!({
            "jsonrpc": "2.0",
            "id": "slow",
            "method": "tools/call",
            "params": {"name": "evaluate_code", "arguments": {"code": "sleep"}}
        }),
    ));

    // Served while the slow call is still pending.
    let health = http(addr, "GET", "/", "").await;
    assert_eq!(health.json()["status"], "ok");

    let response = hung.await.unwrap();
    assert_eq!(response["id"], "slow");
    assert_eq!(response["error"]["code"], -32000);
    assert!(
        response["error"]["data"]
            .as_str()
            .unwrap()
            .contains("timed out")
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn missing_tool_name_is_invalid_params() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = rpc(
        addr,
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"arguments": {}}}),
    )
    .await;

    assert_eq!(response["id"], 4);
    assert_eq!(response["error"]["code"], -32602);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn get_on_other_path_is_invalid_request() {
    let (server, _state) = build_server(test_config());
    let addr = server.start(0).await.unwrap();

    let response = http(addr, "GET", "/mcp", "").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.json()["error"]["code"], -32600);

    server.stop().await.unwrap();
}
