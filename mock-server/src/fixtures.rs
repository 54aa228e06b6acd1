//! Routes that misbehave on request.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ApiFailure;

/// Answer with `code` and a small JSON body (no body for 204/304).
pub async fn status(Path(code): Path<u16>) -> Response {
    let status = match StatusCode::from_u16(code) {
        Ok(status) if code >= 200 => status,
        _ => return ApiFailure::new(StatusCode::BAD_REQUEST, "INVALID_STATUS").into_response(),
    };
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return status.into_response();
    }
    (status, Json(json!({ "ok": status.is_success(), "status": code }))).into_response()
}

/// A 200 whose body is not JSON.
pub async fn plain() -> &'static str {
    "mock backend is up"
}
