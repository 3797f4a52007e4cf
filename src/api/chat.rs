//! Chat API endpoints
//!
//! POST /api/chat        - Run the pipeline and return the final answer
//! POST /api/chat/stream - Run the pipeline as a Server-Sent Events stream
//!
//! Both take `{"query": "..."}`. A missing, non-string or blank query is
//! rejected with 400 before any stage runs.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderName, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Extension, Json, Router,
};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use strata_core::{event_stream, BatchOutcome, FinalResponse, Strategy, WorkflowOrchestrator};
use tracing::{info, warn};

use super::config::AppConfigView;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Successful batch response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub query: String,
    pub response: Option<FinalResponse>,
    pub strategy: Option<Strategy>,
    pub execution_count: usize,
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Pull a usable query out of the request body
fn extract_query(body: Result<Json<Value>, JsonRejection>) -> Result<String, Response> {
    body.ok()
        .and_then(|Json(value)| {
            value
                .get("query")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Query is required" }),
            )
        })
}

async fn chat(
    Extension(orchestrator): Extension<WorkflowOrchestrator>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let query = match extract_query(body) {
        Ok(query) => query,
        Err(rejection) => return rejection,
    };
    info!(query = %query, "Chat request");

    match orchestrator.run_batch(&query).await {
        BatchOutcome::Completed(state) => Json(ChatResponse {
            execution_count: state.execution_results.len(),
            response: state.final_response,
            strategy: state.strategy,
            query: state.query,
        })
        .into_response(),
        BatchOutcome::Failed { error, query } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error, "query": query }),
        ),
    }
}

async fn chat_stream(
    Extension(orchestrator): Extension<WorkflowOrchestrator>,
    Extension(view): Extension<AppConfigView>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let query = match extract_query(body) {
        Ok(query) => query,
        Err(rejection) => return rejection,
    };

    if !view.stream_enabled {
        warn!("Streaming request while streaming is disabled");
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "Streaming is disabled" }),
        );
    }
    info!(query = %query, "Streaming chat request");

    let workflow = orchestrator.run_streaming(query.clone());
    let events = event_stream(query, workflow).map(|event| Event::default().json_data(&event));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

/// Create chat routes
pub fn chat_routes() -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
}
