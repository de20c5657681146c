//! Access-token claims and bearer-header helpers.
//!
//! The issuer signs [`AccessClaims`] into an HS256 JWT; resource servers that
//! share the secret can decode the same structure. Header parsing lives here
//! too so that every consumer applies the same `Bearer ` rule.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - `name` and `jti` are redacted in Debug output

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical access tokens are 250-400 bytes. Anything larger is rejected
/// before base64 decoding or HMAC computation.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Authorization scheme prefix. Case-sensitive, single space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Errors from reading the `Authorization` header.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    /// No `Authorization` header was sent.
    #[error("Missing Authorization header")]
    Missing,

    /// Header present but not `Bearer <token>` (or token empty).
    #[error("Invalid Authorization header format")]
    Malformed,
}

/// Access-token claims.
///
/// `user_id`, `scopes`, `name` and `jti` default when absent so that a
/// structurally valid token missing them still decodes; callers reject it
/// through [`AccessClaims::is_complete`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Store-assigned user identifier.
    #[serde(default)]
    pub user_id: i64,

    /// Display name at issue time.
    #[serde(default)]
    pub name: String,

    /// Scope string, format opaque to the issuer.
    #[serde(default)]
    pub scopes: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Unique token identifier; distinguishes tokens minted in the same second.
    #[serde(default)]
    pub jti: String,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("user_id", &self.user_id)
            .field("name", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

impl AccessClaims {
    /// True when the claims identify a user and carry a scope string.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.user_id != 0 && !self.scopes.is_empty()
    }

    /// Seconds between issue and expiry.
    #[must_use]
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

/// Extract the token from a raw `Authorization` header value.
///
/// Works on bytes so that a header with a well-formed prefix but a
/// non-ASCII remainder still counts as a bearer token.
///
/// # Errors
///
/// - `Missing` when `header` is `None`
/// - `Malformed` when the value lacks the exact `Bearer ` prefix or the
///   remainder is empty
pub fn bearer_token(header: Option<&[u8]>) -> Result<&[u8], BearerError> {
    let value = header.ok_or(BearerError::Missing)?;
    match value.strip_prefix(BEARER_PREFIX.as_bytes()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}

/// Reject tokens above [`MAX_JWT_SIZE_BYTES`].
#[must_use]
pub fn within_size_limit(token: &str) -> bool {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return false;
    }
    true
}
