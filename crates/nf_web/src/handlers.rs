use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use nf_core::Error;
use serde_json::{json, Value};

use crate::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.tools.list())
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let Some(tool) = state.tools.get(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown tool: {}", name) })),
        );
    };

    let args = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(args) => args,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Invalid JSON body: {}", e) })),
                )
            }
        }
    };

    match tool.call(args).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "tool": name, "result": result }))),
        Err(e @ Error::InvalidArguments(_)) => (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))),
        Err(e) => {
            tracing::error!("Tool {} failed: {}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
