use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe: the process is up and serving.
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// General health check reporting the state of each service.
pub async fn healthcheck() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "services": { "application": "ok" } })),
    )
}

pub async fn hello() -> &'static str {
    "Hello World"
}
