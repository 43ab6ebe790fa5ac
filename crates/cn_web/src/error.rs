use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cn_core::Error;
use serde_json::json;

/// Maps domain errors onto HTTP responses with a user-facing message.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Backend { .. } | Error::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let message = match &self.0 {
            Error::NotFound(what) => format!("Not found: {}", what),
            other => other.user_message(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
