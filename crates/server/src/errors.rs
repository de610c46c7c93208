use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::{ErrorKind, ServiceError};
use thiserror::Error;
use tracing::{error, warn};

/// Operation-level failure. Always rendered as HTTP 200 with an `error` key;
/// the submitted `_id` is echoed when the error concerns a specific issue.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let msg = match err.kind() {
            ErrorKind::Internal => {
                error!(error = %err, "storage failure");
                "internal server error".to_string()
            }
            _ => err.to_string(),
        };
        let mut body = serde_json::json!({ "error": msg });
        if let Some(id) = err.issue_id() {
            body["_id"] = serde_json::Value::from(id);
        }
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Request body that could not be decoded at all.
#[derive(Debug, Error)]
#[error("invalid request body: {0}")]
pub struct BodyRejection(pub String);

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let msg = self.to_string();
        warn!(error = %msg, "body rejected");
        (StatusCode::OK, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage init failed: {0}")]
    Storage(String),
}
