//! Process-wide request throttle (§5, ambient). Unkeyed: every caller shares
//! one token bucket, the same coarse policy a small self-hosted service
//! needs and no more.

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "rate_limit_exceeded",
                    "message": "too many requests, please wait before retrying"
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}
