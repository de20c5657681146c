//! Token issuance: reuse, rotate or mint a user's current token.
//!
//! # Rotation policies
//!
//! - **Strict** (default): a per-user lease serializes refreshes inside this
//!   process, and every mint is committed with an atomic compare-and-swap
//!   that also deletes the superseded token's resolution entry. Across
//!   instances the CAS decides the winner; losers return the winner's token.
//! - **Legacy**: two plain writes and no lease. The superseded token keeps
//!   resolving until its own entry expires, and concurrent refreshes can
//!   double-mint.
//!
//! A token is rotated once its resolution entry has less than
//! [`REFRESH_THRESHOLD_SECONDS`] left. Legacy additionally requires the
//! remaining TTL to be non-zero and reuses the token otherwise.

use crate::config::{RotationPolicy, REFRESH_THRESHOLD_SECONDS, TOKEN_TTL_SECONDS};
use crate::crypto::TokenCodec;
use crate::errors::IssuerError;
use crate::models::{IssueOutcome, IssuedToken, VerifiedIdentity};
use crate::observability::hash_for_correlation;
use crate::session::{SessionCache, SwapOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

const LEASE_SHARDS: usize = 64;
const MAX_COMMIT_ATTEMPTS: u32 = 3;

const TOKEN_TTL: Duration = Duration::from_secs(TOKEN_TTL_SECONDS);
const REFRESH_THRESHOLD: Duration = Duration::from_secs(REFRESH_THRESHOLD_SECONDS);

/// Sharded per-user mutex. Two users may share a shard; that only costs
/// contention, never correctness.
struct UserLocks {
    shards: Vec<Mutex<()>>,
}

impl UserLocks {
    fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    fn shard(&self, user_id: i64) -> Option<&Mutex<()>> {
        let len = i64::try_from(self.shards.len()).ok()?;
        let index = usize::try_from(user_id.rem_euclid(len)).ok()?;
        self.shards.get(index)
    }
}

pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    sessions: SessionCache,
    policy: RotationPolicy,
    locks: UserLocks,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, sessions: SessionCache, policy: RotationPolicy) -> Self {
        Self {
            codec,
            sessions,
            policy,
            locks: UserLocks::new(LEASE_SHARDS),
        }
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Return the user's current token, rotating or minting as needed.
    ///
    /// # Errors
    ///
    /// - `IssuerError::SessionStore` on any session store failure, including
    ///   a failed TTL lookup, or when a strict commit cannot settle
    /// - `IssuerError::Signing` if minting fails
    #[instrument(skip_all, fields(
        user = %hash_for_correlation(&identity.user_id.to_string()),
        policy = self.policy.as_str(),
        outcome = tracing::field::Empty,
    ))]
    pub async fn issue_or_refresh(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<IssuedToken, IssuerError> {
        let issued = match self.policy {
            RotationPolicy::Legacy => self.issue_legacy(identity).await?,
            RotationPolicy::Strict => self.issue_strict(identity).await?,
        };

        tracing::Span::current().record("outcome", issued.outcome.as_str());
        tracing::debug!(target: "issuer.tokens", outcome = issued.outcome.as_str(), "Token issued");
        Ok(issued)
    }

    fn mint(&self, identity: &VerifiedIdentity) -> Result<String, IssuerError> {
        self.codec.create(identity.user_id, &identity.name, &identity.scopes)
    }

    async fn issue_legacy(&self, identity: &VerifiedIdentity) -> Result<IssuedToken, IssuerError> {
        let user_id = identity.user_id;

        let outcome = match self.sessions.current_token(user_id).await? {
            None => IssueOutcome::Minted,
            Some(current) => match self.sessions.token_ttl(&current).await? {
                // Redis reports a key with under a second left as 0s.
                Some(ttl) if !ttl.is_zero() && ttl < REFRESH_THRESHOLD => IssueOutcome::Rotated,
                _ => {
                    return Ok(IssuedToken {
                        access_token: current,
                        outcome: IssueOutcome::Reused,
                    })
                }
            },
        };

        let access_token = self.mint(identity)?;
        self.sessions.bind(user_id, &access_token, TOKEN_TTL).await?;

        Ok(IssuedToken {
            access_token,
            outcome,
        })
    }

    async fn issue_strict(&self, identity: &VerifiedIdentity) -> Result<IssuedToken, IssuerError> {
        let user_id = identity.user_id;
        let lease = self.locks.shard(user_id).ok_or(IssuerError::Internal)?;
        let _lease = lease.lock().await;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.sessions.current_token(user_id).await?;

            let outcome = match &current {
                None => IssueOutcome::Minted,
                Some(token) => match self.sessions.token_ttl(token).await? {
                    // Pointer without a resolution entry is dead.
                    None => IssueOutcome::Minted,
                    Some(ttl) if ttl < REFRESH_THRESHOLD => IssueOutcome::Rotated,
                    Some(_) => {
                        return Ok(IssuedToken {
                            access_token: token.clone(),
                            outcome: IssueOutcome::Reused,
                        })
                    }
                },
            };

            let access_token = self.mint(identity)?;
            match self
                .sessions
                .rotate(user_id, current.as_deref(), &access_token, TOKEN_TTL)
                .await?
            {
                SwapOutcome::Swapped => {
                    return Ok(IssuedToken {
                        access_token,
                        outcome,
                    })
                }
                SwapOutcome::Conflict {
                    current: Some(winner),
                } => {
                    tracing::debug!(
                        target: "issuer.tokens",
                        attempt = attempt,
                        "Lost session commit race, returning winning token"
                    );
                    return Ok(IssuedToken {
                        access_token: winner,
                        outcome: IssueOutcome::Reused,
                    });
                }
                SwapOutcome::Conflict { current: None } => {
                    tracing::debug!(
                        target: "issuer.tokens",
                        attempt = attempt,
                        "Session vanished during commit, retrying"
                    );
                }
            }
        }

        tracing::warn!(
            target: "issuer.tokens",
            attempts = MAX_COMMIT_ATTEMPTS,
            "Session commit did not settle"
        );
        Err(IssuerError::SessionStore(format!(
            "session commit did not settle after {MAX_COMMIT_ATTEMPTS} attempts"
        )))
    }
}
