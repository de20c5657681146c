//! Bearer token introspection.
//!
//! A token is active only if it verifies, carries complete claims, and the
//! session cache still resolves it to the user named in its claims.

use crate::crypto::TokenCodec;
use crate::errors::IssuerError;
use crate::models::{InactiveReason, Introspection};
use crate::observability::metrics::record_introspection;
use crate::session::SessionCache;
use std::sync::Arc;
use tracing::instrument;

pub struct IntrospectionService {
    codec: Arc<TokenCodec>,
    sessions: SessionCache,
}

impl IntrospectionService {
    pub fn new(codec: Arc<TokenCodec>, sessions: SessionCache) -> Self {
        Self { codec, sessions }
    }

    /// Introspect a raw token (the bearer prefix already stripped).
    ///
    /// # Errors
    ///
    /// `IssuerError::SessionStore` if the cache cannot be read. A cache miss
    /// is an inactive result, not an error.
    #[instrument(skip_all, fields(result = tracing::field::Empty))]
    pub async fn introspect(&self, token: &str) -> Result<Introspection, IssuerError> {
        let result = self.evaluate(token).await;

        match &result {
            Ok(introspection) => {
                tracing::Span::current().record("result", introspection.result_label());
                record_introspection(introspection.result_label());
            }
            Err(_) => record_introspection("error"),
        }

        result
    }

    async fn evaluate(&self, token: &str) -> Result<Introspection, IssuerError> {
        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(_) => return Ok(Introspection::Inactive(InactiveReason::InvalidToken)),
        };

        if !claims.is_complete() {
            return Ok(Introspection::Inactive(InactiveReason::IncompleteClaims));
        }

        let Some(resolved) = self.sessions.resolve(token).await? else {
            return Ok(Introspection::Inactive(InactiveReason::NotInSession));
        };

        if resolved != claims.user_id.to_string() {
            return Ok(Introspection::Inactive(InactiveReason::UserMismatch));
        }

        Ok(Introspection::Active {
            scope: claims.scopes,
        })
    }
}
