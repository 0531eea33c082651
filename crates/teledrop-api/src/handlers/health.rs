//! Liveness endpoint (§6, ambient surface). No auth, never touches the
//! Metadata Store or Blob Store — a 200 only means the process is up.

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[utoipa::path(get, path = "/health", tag = "Health", responses((status = 200, description = "Service is alive")))]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
