//! Rendering of [`Error`] as an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Display output may carry upstream detail; it stays in the logs
        if status.is_server_error() {
            tracing::error!(kind = %self.kind(), error = %self, "request failed");
        } else {
            tracing::warn!(kind = %self.kind(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
