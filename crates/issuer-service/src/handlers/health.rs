//! Health check handlers.
//!
//! - `/health`: liveness, returns OK while the process runs
//! - `/ready`: readiness, pings the user store and the session store

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler. Does not touch dependencies.
pub async fn health_check() -> &'static str {
    "OK"
}

fn health_label(healthy: bool) -> &'static str {
    if healthy {
        "healthy"
    } else {
        "unhealthy"
    }
}

/// Readiness probe handler.
///
/// Returns 200 when both stores answer, 503 otherwise. Failure details are
/// logged, never returned.
#[tracing::instrument(skip_all, name = "issuer.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database, session_store) = tokio::join!(state.users.ping(), state.sessions.ping());

    if let Err(e) = &database {
        tracing::warn!(target: "issuer.health", error = %e, "Readiness check failed: user store");
    }
    if let Err(e) = &session_store {
        tracing::warn!(target: "issuer.health", error = %e, "Readiness check failed: session store");
    }

    let ready = database.is_ok() && session_store.is_ok();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            database: health_label(database.is_ok()).to_string(),
            session_store: health_label(session_store.is_ok()).to_string(),
        }),
    )
}
