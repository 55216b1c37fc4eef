//! API error taxonomy
//!
//! Every handler returns `Result<_, ApiError>`. The enum implements
//! [`IntoResponse`] so failures become JSON bodies of the shape
//! `{"message": "..."}` with the matching status code. Store and staging
//! failures are logged server-side; clients only ever see a generic
//! message for 500-class errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::database::StoreError;
use crate::staging::StagingError;

/// Classified request failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or unverifiable bearer credential. Deliberately
    /// a single variant: the response never reveals which case occurred.
    #[error("Invalid or missing authorization token")]
    Unauthorized,

    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The uploaded file is neither an image nor a video.
    #[error("only image and video uploads are accepted (got {0})")]
    UnsupportedMediaType(String),

    /// The external media host rejected or failed the upload.
    #[error("Media host upload failed")]
    PublishFailed,

    /// The persistent store failed; details stay in the logs.
    #[error("internal store failure")]
    Store(#[from] StoreError),

    /// Anything unclassified; the client sees no internal detail.
    #[error("Internal server error")]
    Internal,
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::UnsupportedMediaType(mime) => ApiError::UnsupportedMediaType(mime),
            StagingError::Io(io) => {
                tracing::error!(error = %io, "failed to stage upload");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string())
            }
            ApiError::PublishFailed | ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiError::Store(err) => {
                // Connectivity failures are distinct from not-found and
                // must not leak internals to the client.
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("File").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::UnsupportedMediaType("text/plain".into())
                .into_response()
                .status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::PublishFailed.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
