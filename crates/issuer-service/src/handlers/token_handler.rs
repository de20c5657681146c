use crate::errors::IssuerError;
use crate::models::{IssuedToken, TokenRequest, TokenResponse};
use crate::observability::metrics::record_token_issuance;
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use common::secret::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;

/// Exchange credentials for the user's current access token
///
/// POST /token
pub async fn handle_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, IssuerError> {
    let start = Instant::now();
    let result = issue(&state, payload).await;

    match &result {
        Ok(issued) => record_token_issuance(issued.outcome.as_str(), "success", start.elapsed()),
        Err(_) => record_token_issuance("none", "error", start.elapsed()),
    }

    let issued = result?;
    Ok(Json(TokenResponse {
        access_token: issued.access_token,
    }))
}

async fn issue(
    state: &AppState,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<IssuedToken, IssuerError> {
    let Json(request) = payload.map_err(|e| IssuerError::MalformedRequest(e.body_text()))?;

    let identity = user_service::verify_credentials(
        state.users.as_ref(),
        &state.digest,
        request.user_id,
        request.password.expose_secret(),
    )
    .await?;

    state.issuer.issue_or_refresh(&identity).await
}
