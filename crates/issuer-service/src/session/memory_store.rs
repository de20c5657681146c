//! In-process session store.
//!
//! Expiry uses `tokio::time::Instant`, so paused-clock tests can move it
//! with `tokio::time::advance`.

use super::{SessionStore, SessionSwap, SwapOutcome};
use crate::errors::IssuerError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Single mutex over a map; `replace_session` is atomic under it.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset a live key's TTL. Returns false if the key is missing.
    pub async fn expire(&self, key: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                true
            }
            _ => false,
        }
    }

    /// Drop a key. Returns true if it was live.
    pub async fn remove(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.remove(key).is_some_and(|entry| entry.is_live(now))
    }

    fn live_value(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<String> {
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, IssuerError> {
        let mut entries = self.entries.lock().await;
        Ok(Self::live_value(&mut entries, key, Instant::now()))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), IssuerError> {
        let expires_at = Some(Instant::now() + ttl);
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>, IssuerError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn replace_session(&self, swap: &SessionSwap) -> Result<SwapOutcome, IssuerError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let current = Self::live_value(&mut entries, &swap.user_key, now);
        if current != swap.expected_token {
            return Ok(SwapOutcome::Conflict { current });
        }

        if let Some(old_key) = &swap.old_token_key {
            entries.remove(old_key);
        }

        let expires_at = Some(now + swap.ttl);
        entries.insert(
            swap.new_token_key.clone(),
            Entry {
                value: swap.user_value.clone(),
                expires_at,
            },
        );
        entries.insert(
            swap.user_key.clone(),
            Entry {
                value: swap.new_token.clone(),
                expires_at,
            },
        );

        Ok(SwapOutcome::Swapped)
    }

    async fn ping(&self) -> Result<(), IssuerError> {
        Ok(())
    }
}
