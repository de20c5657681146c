use crate::errors::IssuerError;
use crate::models::{RegisterUserRequest, RegisterUserResponse};
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// Register a user
///
/// POST /user
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Json<RegisterUserResponse>, IssuerError> {
    let Json(request) = payload.map_err(|e| IssuerError::MalformedRequest(e.body_text()))?;

    let user = user_service::register_user(state.users.as_ref(), &state.digest, request).await?;

    Ok(Json(RegisterUserResponse::from(user)))
}
