//! Builder patterns for test data construction
//!
//! Forges access tokens with chosen claims, signed with any secret.

use chrono::{Duration, Utc};
use common::jwt::AccessClaims;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

/// Builder for test access tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(7)
///     .with_scopes("admin,read")
///     .expires_in(-60)
///     .sign(TEST_SIGNING_SECRET);
/// ```
pub struct TestTokenBuilder {
    claims: AccessClaims,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults (user 1, scope "user", 1 hour)
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            claims: AccessClaims {
                user_id: 1,
                name: "test-user".to_string(),
                scopes: "user".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::seconds(3600)).timestamp(),
                jti: uuid::Uuid::new_v4().to_string(),
            },
        }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.claims.user_id = user_id;
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.claims.name = name.to_string();
        self
    }

    pub fn with_scopes(mut self, scopes: &str) -> Self {
        self.claims.scopes = scopes.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.iat = timestamp;
        self
    }

    pub fn build(self) -> AccessClaims {
        self.claims
    }

    /// Sign with HS256 under `secret`
    pub fn sign(self, secret: &[u8]) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        encode(&header, &self.claims, &EncodingKey::from_secret(secret))
            .expect("HS256 signing with a byte secret cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
