use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request-terminal failures.
///
/// An invalid or revoked token during introspection is NOT an error; it is
/// reported as an inactive result.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("User store error: {0}")]
    Database(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Internal server error")]
    Internal,
}

impl IssuerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IssuerError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            IssuerError::Unauthorized => StatusCode::UNAUTHORIZED,
            IssuerError::Database(_)
            | IssuerError::SessionStore(_)
            | IssuerError::Signing(_)
            | IssuerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for IssuerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            IssuerError::MalformedRequest(_) => ("INVALID_REQUEST", "Invalid request body"),
            IssuerError::Unauthorized => ("UNAUTHORIZED", "Unauthorized"),
            IssuerError::Database(_) => ("DATABASE_ERROR", "An internal database error occurred"),
            IssuerError::SessionStore(_) => {
                ("SESSION_STORE_ERROR", "An internal session store error occurred")
            }
            IssuerError::Signing(_) => ("TOKEN_CREATION_ERROR", "Token creation error"),
            IssuerError::Internal => ("INTERNAL_ERROR", "An internal error occurred"),
        };

        if status.is_server_error() {
            tracing::error!(target: "issuer.errors", error = %self, "Request failed");
        } else {
            tracing::debug!(target: "issuer.errors", error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}
