//! Integration tests for the tool-calling layer
//!
//! These tests run against mock HTTP servers; no gateway credential or
//! network access is required.

use serde_json::{json, Value};
use skychat::catalog::{Catalog, PathConvention};
use skychat::config::test_settings;
use skychat::core::llm::ChatMessage;
use skychat::schema::SchemaDocument;
use skychat::tools::dispatch::Dispatcher;
use skychat::{Orchestrator, ToolRegistry, TurnEvent};
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn single_get_schema(base_url: &str) -> SchemaDocument {
    serde_json::from_value(json!({
        "openapi": "3.0.0",
        "servers": [{"url": base_url}],
        "paths": {
            "/linkedin/people-search": {
                "get": {
                    "deprecated": false,
                    "parameters": [
                        {
                            "name": "query",
                            "in": "query",
                            "required": true,
                            "schema": {"type": "string"},
                            "description": "The search query for finding LinkedIn profiles"
                        }
                    ],
                    "description": "LinkedIn people search",
                    "operationId": "linkedinPeopleSearch"
                }
            }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_end_to_end_dispatch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/linkedin/people-search"))
        .and(query_param("query", "engineers"))
        .and(header("skyfire-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Jane"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let schema = single_get_schema(&mock_server.uri());
    let catalog = Catalog::build(&schema, &PathConvention::vetric()).unwrap();
    assert_eq!(catalog.names(), vec!["fetchLinkedinPeopleSearch".to_string()]);

    let dispatcher = Dispatcher::new("test-key");
    let result = dispatcher
        .dispatch(&catalog, "fetchLinkedinPeopleSearch", "engineers")
        .await;

    assert!(result.success);
    assert_eq!(result.operation, "fetchLinkedinPeopleSearch");
    assert_eq!(result.service.as_deref(), Some("linkedin"));
    assert_eq!(result.endpoint.as_deref(), Some("people-search"));
    assert_eq!(result.query, "engineers");
    assert_eq!(result.result, Some(json!([{"name": "Jane"}])));
}

#[tokio::test]
async fn test_registry_offers_full_tool_set() {
    let registry = ToolRegistry::build("https://gateway.example", "test-key").unwrap();

    let mut names = registry.tool_names();
    names.sort();
    assert_eq!(
        names,
        vec!["compose_email", "send_email", "show_images", "vetric_http"]
    );

    let instructions = registry.instructions();
    for operation in [
        "fetchTwitterTop",
        "fetchLinkedinPeopleSearch",
        "fetchInstagramPeopleSearch",
        "postFacebookSearchUsers",
    ] {
        assert!(instructions.contains(operation), "missing {operation}");
    }
}

/// Scripted LLM: first completion asks for a show_images call, second
/// completion answers in text. The orchestrator should run the tool locally
/// and feed its payload back before the final answer.
#[tokio::test]
async fn test_orchestrator_tool_round_trip() {
    let mock_server = MockServer::start().await;

    let tool_sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"type\":\"function\",\"function\":{\"name\":\"show_images\",\"arguments\":\"\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"urls\\\":[\\\"https://example.com/cat.png\\\"]}\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    let text_sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Here is\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" your cat.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/proxy/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(tool_sse))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/proxy/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(text_sse))
        .mount(&mock_server)
        .await;

    let settings = test_settings(&mock_server.uri());
    let orchestrator = Orchestrator::new(&settings, "test-key").unwrap();

    let (tx, mut rx) = mpsc::channel(64);
    let messages = vec![ChatMessage::user("show me a cat")];
    let turn = tokio::spawn(async move { orchestrator.run_turn(messages, tx).await });

    let mut tokens = String::new();
    let mut tool_results: Vec<(String, Value)> = Vec::new();
    let mut saw_done = false;
    while let Some(event) = rx.recv().await {
        match event {
            TurnEvent::Token { content } => tokens.push_str(&content),
            TurnEvent::ToolResult { tool, payload } => tool_results.push((tool, payload)),
            TurnEvent::Done => saw_done = true,
            TurnEvent::Error { message } => panic!("unexpected error event: {message}"),
        }
    }
    turn.await.unwrap().unwrap();

    assert!(saw_done);
    assert_eq!(tokens, "Here is your cat.");
    assert_eq!(tool_results.len(), 1);
    let (tool, payload) = &tool_results[0];
    assert_eq!(tool, "show_images");
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["urls"][0], "https://example.com/cat.png");
}

/// An unknown operation never reaches the wire, and an unknown tool name
/// becomes a failure payload the conversation can carry forward.
#[tokio::test]
async fn test_orchestrator_surfaces_invalid_tool_call() {
    let mock_server = MockServer::start().await;

    let bad_call_sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"type\":\"function\",\"function\":{\"name\":\"vetric_http\",\"arguments\":\"{\\\"operation\\\":\\\"fetchNothing\\\",\\\"query\\\":\\\"x\\\"}\"}}]}}]}\n\n",
        "data: [DONE]\n\n",
    );
    let text_sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"That operation does not exist.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/proxy/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bad_call_sse))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/proxy/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(text_sse))
        .mount(&mock_server)
        .await;

    let settings = test_settings(&mock_server.uri());
    let orchestrator = Orchestrator::new(&settings, "test-key").unwrap();

    let (tx, mut rx) = mpsc::channel(64);
    let messages = vec![ChatMessage::user("fetch nothing")];
    let turn = tokio::spawn(async move { orchestrator.run_turn(messages, tx).await });

    let mut tool_results: Vec<(String, Value)> = Vec::new();
    while let Some(event) = rx.recv().await {
        if let TurnEvent::ToolResult { tool, payload } = event {
            tool_results.push((tool, payload));
        }
    }
    turn.await.unwrap().unwrap();

    assert_eq!(tool_results.len(), 1);
    let (_, payload) = &tool_results[0];
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("fetchNothing"));
}
