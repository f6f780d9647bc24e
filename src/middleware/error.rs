use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::Error;

/// Errors returned by the session and page-data routes.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The request body could not be read as a session payload.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Failure from the bridge core.
    #[error(transparent)]
    Bridge(#[from] Error),
}

impl SessionError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::Bridge(Error::MissingCredential) => {
                StatusCode::BAD_REQUEST
            }
            Self::Bridge(Error::AuthenticationFailure { .. }) => StatusCode::UNAUTHORIZED,
            Self::Bridge(Error::Network(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Bridge(Error::Resource { .. } | Error::Decode(_)) => StatusCode::BAD_GATEWAY,
            Self::Bridge(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Bridge(e) if e.requires_reauthentication() => json!({
                "success": false,
                "error": self.to_string(),
                "reauthenticate": true,
            }),
            Self::Bridge(e) if e.is_retryable() => json!({
                "success": false,
                "error": self.to_string(),
                "retryable": true,
            }),
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Session bridge internal error");
                json!({ "success": false, "error": "Internal error" })
            }
            _ => json!({ "success": false, "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
