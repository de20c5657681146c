//! HTTP routes for the token issuer.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::{PasswordDigest, TokenCodec};
use crate::errors::IssuerError;
use crate::handlers;
use crate::repositories::UserRepository;
use crate::services::{IntrospectionService, TokenIssuer};
use crate::session::{SessionCache, SessionStore};
use axum::{
    routing::{get, post},
    Router,
};
use common::secret::{ExposeSecret, SecretBox};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User store.
    pub users: Arc<dyn UserRepository>,

    /// Password verifier for registration and credential checks.
    pub digest: PasswordDigest,

    pub issuer: Arc<TokenIssuer>,

    pub introspection: Arc<IntrospectionService>,

    /// Session cache (readiness probe).
    pub sessions: SessionCache,
}

impl AppState {
    /// Wire services from configuration and the two stores.
    ///
    /// # Errors
    ///
    /// `IssuerError::Signing` if the signing secret is unusable.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, IssuerError> {
        let codec = Arc::new(TokenCodec::new(&config.signing_secret)?);
        let sessions = SessionCache::new(store);

        Ok(Self {
            users,
            digest: PasswordDigest::new(SecretBox::new(Box::new(
                config.hash_salt.expose_secret().clone(),
            ))),
            issuer: Arc::new(TokenIssuer::new(
                codec.clone(),
                sessions.clone(),
                config.rotation_policy,
            )),
            introspection: Arc::new(IntrospectionService::new(codec, sessions.clone())),
            sessions,
        })
    }
}

/// Build the application routes.
///
/// - `POST /user` - register a user
/// - `POST /token` - exchange credentials for the current token
/// - `GET /check` - introspect a bearer token
/// - `/health`, `/ready`, `/metrics` - operational endpoints
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/user", post(handlers::handle_register))
        .route("/token", post(handlers::handle_token))
        .route("/check", get(handlers::handle_check))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
