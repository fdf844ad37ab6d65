//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a JSON-body
//! HTTP response with an appropriate status code.
//!
//! Internal errors are logged with full detail but only a generic message is
//! returned to the caller.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_types::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::FeedbackError;

/// All errors that can occur in the relay-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The body was not the JSON we expect.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The body decoded but failed field checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Feedback could be neither attached nor inserted.
    #[error("feedback storage failed: {0}")]
    FeedbackStorage(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<FeedbackError> for ServerError {
    fn from(e: FeedbackError) -> Self {
        match e {
            FeedbackError::Validation(v) => ServerError::Validation(v),
            FeedbackError::Storage(s) => ServerError::FeedbackStorage(s.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
            ServerError::Validation(v) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": v.to_string(), "fields": v.fields() }),
            ),

            ServerError::FeedbackStorage(m) => {
                error!(error = %m, "feedback storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Error saving feedback" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::StorageError;

    #[test]
    fn storage_failure_hides_detail() {
        let err: ServerError =
            FeedbackError::Storage(StorageError::Database(sqlx::Error::PoolClosed)).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_is_client_error() {
        let resp = ServerError::BadRequest("missing field `messageId`".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
