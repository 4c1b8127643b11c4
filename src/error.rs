//! Request-level error type.

use thiserror::Error;

/// Errors surfaced to API callers.
///
/// With the `api` feature this renders as `{"detail": "..."}` with the
/// matching HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Internal(msg) => msg,
        }
    }
}

#[cfg(feature = "api")]
mod response {
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde_json::json;

    use super::AppError;

    impl AppError {
        pub fn status(&self) -> StatusCode {
            match self {
                Self::NotFound(_) => StatusCode::NOT_FOUND,
                Self::BadRequest(_) => StatusCode::BAD_REQUEST,
                Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status();
            if status.is_server_error() {
                tracing::error!(%status, detail = self.detail(), "request failed");
            } else {
                tracing::warn!(%status, detail = self.detail(), "request rejected");
            }

            (status, Json(json!({ "detail": self.detail() }))).into_response()
        }
    }

    impl From<serde_json::Error> for AppError {
        fn from(e: serde_json::Error) -> Self {
            Self::Internal(format!("serialization failed: {e}"))
        }
    }
}
