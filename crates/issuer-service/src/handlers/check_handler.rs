use crate::errors::IssuerError;
use crate::models::IntrospectionResponse;
use crate::observability::metrics::record_introspection;
use crate::routes::AppState;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::bearer_token;
use std::sync::Arc;

/// Introspect the bearer token
///
/// GET /check
///
/// A missing or malformed `Authorization` header answers 401 with the
/// inactive body. Every other inactive token answers 200.
pub async fn handle_check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, IssuerError> {
    let header = headers.get(AUTHORIZATION).map(HeaderValue::as_bytes);

    let token = match bearer_token(header) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(target: "issuer.check", reason = %e, "Rejected authorization header");
            record_introspection("bad_header");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(IntrospectionResponse::inactive()),
            )
                .into_response());
        }
    };

    // Undecodable bytes can never verify; they fall through as an invalid token.
    let token = String::from_utf8_lossy(token);
    let result = state.introspection.introspect(&token).await?;

    Ok(Json(IntrospectionResponse::from(result)).into_response())
}
