use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Scope string given to users who register without one.
pub const DEFAULT_SCOPES: &str = "user";

/// User model (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    #[sqlx(rename = "id")]
    pub user_id: i64,
    pub name: String,
    /// Stored password verifier (hex digest), never the password.
    #[sqlx(rename = "password")]
    pub password_digest: String,
    pub scopes: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("password_digest", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Identity produced by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: i64,
    pub name: String,
    pub scopes: String,
}

impl From<User> for VerifiedIdentity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            scopes: user.scopes,
        }
    }
}

/// POST /user body.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub password: SecretString,
    #[serde(default)]
    pub scopes: Option<String>,
}

impl RegisterUserRequest {
    /// Requested scopes, or [`DEFAULT_SCOPES`] when missing or empty.
    pub fn effective_scopes(&self) -> &str {
        match self.scopes.as_deref() {
            Some(scopes) if !scopes.is_empty() => scopes,
            _ => DEFAULT_SCOPES,
        }
    }
}

/// POST /user response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterUserResponse {
    pub user_id: i64,
    pub name: String,
    pub scopes: String,
}

impl From<User> for RegisterUserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            scopes: user.scopes,
        }
    }
}

/// POST /token body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub user_id: i64,
    pub password: SecretString,
}

/// POST /token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// What `TokenIssuer` did to produce the returned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// No usable session existed; a new token was minted.
    Minted,
    /// The current token was returned unchanged.
    Reused,
    /// The current token was near expiry and was replaced.
    Rotated,
}

impl IssueOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueOutcome::Minted => "minted",
            IssueOutcome::Reused => "reused",
            IssueOutcome::Rotated => "rotated",
        }
    }
}

/// Token handed back by `TokenIssuer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub outcome: IssueOutcome,
}

/// Why introspection reported a token inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveReason {
    /// Malformed, bad signature, or expired.
    InvalidToken,
    /// Missing scopes or zero user id.
    IncompleteClaims,
    /// No resolution entry for the token (rotated away, revoked, or lapsed).
    NotInSession,
    /// Resolution entry names a different user.
    UserMismatch,
}

impl InactiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveReason::InvalidToken => "invalid_token",
            InactiveReason::IncompleteClaims => "incomplete_claims",
            InactiveReason::NotInSession => "not_in_session",
            InactiveReason::UserMismatch => "user_mismatch",
        }
    }
}

/// Result of introspecting a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Introspection {
    Active { scope: String },
    Inactive(InactiveReason),
}

impl Introspection {
    pub fn is_active(&self) -> bool {
        matches!(self, Introspection::Active { .. })
    }

    /// Metrics label.
    pub fn result_label(&self) -> &'static str {
        match self {
            Introspection::Active { .. } => "active",
            Introspection::Inactive(reason) => reason.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Active,
    Inactive,
}

/// GET /check response. `scope` serializes as `null` when inactive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntrospectionResponse {
    pub status: TokenStatus,
    pub scope: Option<String>,
}

impl IntrospectionResponse {
    pub fn inactive() -> Self {
        Self {
            status: TokenStatus::Inactive,
            scope: None,
        }
    }
}

impl From<Introspection> for IntrospectionResponse {
    fn from(result: Introspection) -> Self {
        match result {
            Introspection::Active { scope } => Self {
                status: TokenStatus::Active,
                scope: Some(scope),
            },
            Introspection::Inactive(_) => Self::inactive(),
        }
    }
}

/// GET /ready response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    pub session_store: String,
}
