//! Session cache: the two directional mappings that make a token "current".
//!
//! # Key Patterns
//!
//! - `session:user:{user_id}` - current token for the user
//! - `session:token:{token}` - user id the token resolves to (decimal)
//!
//! Both entries carry their own TTL. At most one current token exists per
//! user because there is exactly one `session:user:{id}` key.
//!
//! # Backends
//!
//! - [`RedisSessionStore`] - shared store for multi-instance deployments
//! - [`InMemorySessionStore`] - single process, used without `REDIS_URL` and in tests

pub mod lua_scripts;
pub mod memory_store;
pub mod redis_store;

pub use memory_store::InMemorySessionStore;
pub use redis_store::RedisSessionStore;

use crate::errors::IssuerError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// One atomic replacement of a user's session.
///
/// Applied only if the user key still holds `expected_token` (or is empty
/// when `expected_token` is `None`). On success the superseded resolution
/// entry is deleted and both new entries are written with `ttl`.
#[derive(Debug, Clone)]
pub struct SessionSwap {
    pub user_key: String,
    pub new_token_key: String,
    pub old_token_key: Option<String>,
    pub expected_token: Option<String>,
    pub new_token: String,
    pub user_value: String,
    pub ttl: Duration,
}

/// Result of [`SessionStore::replace_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    /// The user key did not hold the expected value; `current` is what it held.
    Conflict { current: Option<String> },
}

/// Key-value store contract the session cache is built on.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, IssuerError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
        -> Result<(), IssuerError>;

    /// Remaining TTL; `None` when the key is missing or has no expiry.
    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, IssuerError>;

    /// Compare-and-swap of a whole session. Must be atomic.
    async fn replace_session(&self, swap: &SessionSwap) -> Result<SwapOutcome, IssuerError>;

    async fn ping(&self) -> Result<(), IssuerError>;
}

/// Typed view over a [`SessionStore`] using the session key layout.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn user_key(user_id: i64) -> String {
        format!("session:user:{user_id}")
    }

    pub fn token_key(token: &str) -> String {
        format!("session:token:{token}")
    }

    /// Token the user key currently points at.
    pub async fn current_token(&self, user_id: i64) -> Result<Option<String>, IssuerError> {
        self.store.get(&Self::user_key(user_id)).await
    }

    /// User id (decimal string) a token resolves to.
    pub async fn resolve(&self, token: &str) -> Result<Option<String>, IssuerError> {
        self.store.get(&Self::token_key(token)).await
    }

    /// Remaining TTL of a token's resolution entry.
    pub async fn token_ttl(&self, token: &str) -> Result<Option<Duration>, IssuerError> {
        self.store.ttl_remaining(&Self::token_key(token)).await
    }

    /// Write both mappings as two independent writes, resolution entry first.
    ///
    /// Nothing is removed; a previously current token keeps resolving until
    /// its own entry expires.
    pub async fn bind(&self, user_id: i64, token: &str, ttl: Duration) -> Result<(), IssuerError> {
        self.store
            .set_with_ttl(&Self::token_key(token), &user_id.to_string(), ttl)
            .await?;
        self.store
            .set_with_ttl(&Self::user_key(user_id), token, ttl)
            .await
    }

    /// Atomically replace `expected` (if any) with `new_token`.
    pub async fn rotate(
        &self,
        user_id: i64,
        expected: Option<&str>,
        new_token: &str,
        ttl: Duration,
    ) -> Result<SwapOutcome, IssuerError> {
        let swap = SessionSwap {
            user_key: Self::user_key(user_id),
            new_token_key: Self::token_key(new_token),
            old_token_key: expected.map(Self::token_key),
            expected_token: expected.map(str::to_string),
            new_token: new_token.to_string(),
            user_value: user_id.to_string(),
            ttl,
        };
        self.store.replace_session(&swap).await
    }

    pub async fn ping(&self) -> Result<(), IssuerError> {
        self.store.ping().await
    }
}
