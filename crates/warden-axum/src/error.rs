//! Error types for gate middleware and extractors.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Authentication and authorization rejections.
///
/// Authentication faults never say why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No `Authorization: Bearer` credential on the request.
    #[error("authentication required")]
    MissingCredentials,

    /// Credential present but failed verification.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Authenticated, but the role is not allowed here.
    #[error("insufficient permissions")]
    Forbidden,
}

impl GateError {
    /// HTTP status for this rejection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Machine-readable code for the JSON body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials | Self::InvalidToken => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });

        let mut response = (self.status(), Json(body)).into_response();
        if self.status() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
