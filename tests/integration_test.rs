//! Integration tests for Strata
//!
//! These tests verify the integration between the crates and the HTTP surface:
//! - strata-tools: builtin registry and tool execution
//! - strata-core: plan runner and orchestrator over real agents
//! - strata-llm: scripted provider driving the agents
//! - strata: router, handlers and streaming responses

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use strata::server::{build_components, build_router, config::AppConfig};
use strata_core::{Plan, PlanRunner, Task, TaskExecutor};
use strata_llm::MockProvider;
use strata_tools::{register_builtins, ToolRegistry};
use tower::ServiceExt;

const GREETING: &str = "Hello! 👋 How can I help you today?";

fn app_with(config: AppConfig) -> Router {
    let components = build_components(&config, Arc::new(MockProvider::new()), None).unwrap();
    build_router(&components, &config)
}

fn app() -> Router {
    app_with(AppConfig::default())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Tool and runner integration
// ============================================================================

#[test]
fn test_runner_with_builtin_extractor() {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry).unwrap();
    let runner = PlanRunner::new(TaskExecutor::new(Arc::new(registry)));

    let plan = Plan::new(
        vec![
            Task::new("t1", "extract", "data_extractor", "email: write to ops@example.com"),
            Task::new("t2", "greet", "direct_llm", "no"),
        ],
        vec!["t1".to_string(), "t2".to_string()],
    );

    let results = tokio_test::block_on(runner.run(&plan));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool, "data_extractor");
    assert_eq!(results[0].result["type"], "email");
    assert_eq!(results[0].result["matches"], json!(["ops@example.com"]));
    assert_eq!(
        results[1].result,
        json!("No problem! Let me know if you need anything else.")
    );
}

#[tokio::test]
async fn test_runner_skips_forward_dependency() {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry).unwrap();
    let runner = PlanRunner::new(TaskExecutor::new(Arc::new(registry)));

    let plan = Plan::new(
        vec![
            Task::new("t1", "", "data_extractor", "date: due 01/15/2024"),
            Task::new("t2", "", "data_extractor", "url: https://example.com").depends_on("t1"),
        ],
        vec!["t2".to_string(), "t1".to_string()],
    );

    let results = runner.run(&plan).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].task_id, "t1");
    assert_eq!(results[0].result["type"], "date");
    assert_eq!(results[0].result["matches"], json!(["01/15/2024"]));
    assert_eq!(results[0].result["count"], 1);
}

// ============================================================================
// HTTP surface
// ============================================================================

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "strata");
    assert_eq!(body["agents"], json!(["strategy", "planning", "execution"]));
    assert_eq!(
        body["tools"],
        json!(["data_extractor", "document_analyzer", "web_search"])
    );
}

#[tokio::test]
async fn test_chat_requires_query() {
    for body in ["{}", r#"{"query": "   "}"#, r#"{"query": 7}"#, "not json"] {
        let response = app().oneshot(post_json("/api/chat", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json_body(response).await, json!({"error": "Query is required"}));
    }
}

#[tokio::test]
async fn test_chat_greeting() {
    let response = app()
        .oneshot(post_json("/api/chat", r#"{"query": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["query"], "hello");
    assert_eq!(body["response"]["final_answer"], GREETING);
    assert_eq!(body["response"]["status"], "completed");
    assert_eq!(body["execution_count"], 1);
    assert_eq!(body["strategy"]["is_conversational"], true);
}

#[tokio::test]
async fn test_chat_stream_greeting() {
    let response = app()
        .oneshot(post_json("/api/chat/stream", r#"{"query": "hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers["x-accel-buffering"], "no");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let events: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(
        types,
        vec!["start", "strategy", "planning", "execution", "aggregation", "final", "complete"]
    );
    assert_eq!(events[0]["data"]["query"], "hi");
    assert_eq!(events[5]["data"]["answer"], GREETING);
    assert_eq!(events[6]["data"]["message"], "Workflow completed successfully");
}

#[tokio::test]
async fn test_chat_stream_requires_query() {
    let response = app()
        .oneshot(post_json("/api/chat/stream", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_stream_disabled() {
    let mut config = AppConfig::default();
    config.agents.stream_enabled = false;

    let response = app_with(config)
        .oneshot(post_json("/api/chat/stream", r#"{"query": "hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_tools() {
    let response = app().oneshot(get("/api/tools")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let tools = body["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(names, vec!["data_extractor", "document_analyzer", "web_search"]);
    assert!(tools.iter().all(|t| t["description"].is_string()));
    assert!(tools.iter().all(|t| t["category"].is_string()));
}

#[tokio::test]
async fn test_config_view() {
    let response = app().oneshot(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["model"], "gpt-4-turbo-preview");
    assert_eq!(body["max_iterations"], 10);
    assert_eq!(body["stream_enabled"], true);
    assert_eq!(body["environment"], "development");
}
