//! Custom test assertions for expressive tests
//!
//! Inspects token structure and claims without verifying the signature.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::jwt::AccessClaims;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT segment {} missing", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

/// Decode the claims segment of a token.
pub fn decode_claims(token: &str) -> AccessClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_user(7)
///     .assert_has_scopes("admin,read")
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Assert three segments, an HS256 `JWT` header and decodable claims
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_user(&self, user_id: i64) -> &Self;

    /// Assert the scope string equals `scopes` exactly
    fn assert_has_scopes(&self, scopes: &str) -> &Self;

    /// Assert `exp` is `seconds` from now (5 seconds tolerance)
    fn assert_expires_in(&self, seconds: u64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let count = self.split('.').count();
        assert_eq!(
            count, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            count
        );

        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        let claims = decode_claims(self);
        assert_eq!(
            claims.lifetime_seconds(),
            3600,
            "Expected a one hour lifetime"
        );

        self
    }

    fn assert_for_user(&self, user_id: i64) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.user_id, user_id,
            "Expected user_id {}, got {}",
            user_id, claims.user_id
        );
        self
    }

    fn assert_has_scopes(&self, scopes: &str) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.scopes, scopes,
            "Expected scopes '{}', got '{}'",
            scopes, claims.scopes
        );
        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = decode_claims(self);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );
        self
    }
}
