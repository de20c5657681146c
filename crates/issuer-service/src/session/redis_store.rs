//! Redis-backed session store.
//!
//! The redis-rs `MultiplexedConnection` is cheap to clone and safe to use
//! concurrently, so every call clones it instead of locking.
//!
//! Failures are logged, counted in `issuer_session_store_errors_total` and
//! returned as `IssuerError::SessionStore`. Nothing is retried here.

use super::{lua_scripts, SessionStore, SessionSwap, SwapOutcome};
use crate::errors::IssuerError;
use crate::observability::metrics::record_session_store_error;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, Script};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Shared session store for multi-instance deployments.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
    rotate_script: Script,
}

fn store_error(operation: &'static str, e: &RedisError) -> IssuerError {
    warn!(
        target: "issuer.session.redis",
        error = %e,
        operation = operation,
        "Session store call failed"
    );
    record_session_store_error(operation);
    IssuerError::SessionStore(format!("{operation} failed: {e}"))
}

/// Redis rounds TTLs to whole seconds; never write a zero or sub-second one.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl RedisSessionStore {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::SessionStore` if the URL is invalid or the
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> Result<Self, IssuerError> {
        // Do NOT log redis_url; it may carry a password.
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "issuer.session.redis", error = %e, "Failed to open Redis client");
            IssuerError::SessionStore(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "issuer.session.redis", error = %e, "Failed to connect to Redis");
                IssuerError::SessionStore(format!("Failed to connect to Redis: {e}"))
            })?;

        Ok(Self {
            connection,
            rotate_script: Script::new(lua_scripts::ROTATE_SESSION),
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip_all)]
    async fn get(&self, key: &str) -> Result<Option<String>, IssuerError> {
        let mut conn = self.connection.clone();
        conn.get(key).await.map_err(|e| store_error("get", &e))
    }

    #[instrument(skip_all)]
    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), IssuerError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds(ttl))
            .await
            .map_err(|e| store_error("set", &e))?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, IssuerError> {
        let mut conn = self.connection.clone();
        let seconds: i64 = conn.ttl(key).await.map_err(|e| store_error("ttl", &e))?;

        // -2: key missing, -1: no expiry
        Ok(u64::try_from(seconds).ok().map(Duration::from_secs))
    }

    #[instrument(skip_all)]
    async fn replace_session(&self, swap: &SessionSwap) -> Result<SwapOutcome, IssuerError> {
        let mut conn = self.connection.clone();
        let old_key = swap
            .old_token_key
            .as_deref()
            .unwrap_or(&swap.new_token_key);

        let (swapped, current): (i64, Option<String>) = self
            .rotate_script
            .key(&swap.user_key)
            .key(&swap.new_token_key)
            .key(old_key)
            .arg(swap.expected_token.as_deref().unwrap_or_default())
            .arg(&swap.new_token)
            .arg(&swap.user_value)
            .arg(ttl_seconds(swap.ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| store_error("replace_session", &e))?;

        if swapped == 1 {
            Ok(SwapOutcome::Swapped)
        } else {
            Ok(SwapOutcome::Conflict { current })
        }
    }

    #[instrument(skip_all)]
    async fn ping(&self) -> Result<(), IssuerError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("ping", &e))?;
        Ok(())
    }
}
