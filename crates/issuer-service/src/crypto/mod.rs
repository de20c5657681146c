//! Token signing and password digests.
//!
//! - [`TokenCodec`] signs and verifies HS256 access tokens.
//! - [`PasswordDigest`] computes the stored password verifier.
//!
//! # Password digest
//!
//! The verifier is `hex(MD5(HASH_SALT || password))`: one global salt and a
//! fast digest, the format existing user rows were written in. It is a known
//! weakness (no per-record salt, no work factor). Replacing it means
//! re-hashing every stored user, which is outside this service's contract.

use crate::config::TOKEN_TTL_SECONDS;
use crate::errors::IssuerError;
use common::jwt::{within_size_limit, AccessClaims};
use common::secret::{ExposeSecret, SecretBox};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use md5::{Digest, Md5};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Why a token failed verification.
///
/// Every variant renders the same message; the kind is only for debug logs
/// and metrics labels. Callers must treat all of them as "inactive".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("The access token is invalid or expired")]
    TooLarge,
    #[error("The access token is invalid or expired")]
    Malformed,
    #[error("The access token is invalid or expired")]
    BadSignature,
    #[error("The access token is invalid or expired")]
    Expired,
}

impl VerificationError {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationError::TooLarge => "too_large",
            VerificationError::Malformed => "malformed",
            VerificationError::BadSignature => "bad_signature",
            VerificationError::Expired => "expired",
        }
    }
}

/// Creates and verifies signed access tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_seconds: i64,
}

impl TokenCodec {
    /// Build a codec over the HMAC secret.
    ///
    /// # Errors
    ///
    /// `IssuerError::Signing` if the secret is empty.
    pub fn new(secret: &SecretBox<Vec<u8>>) -> Result<Self, IssuerError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(IssuerError::Signing("signing secret is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime_seconds: TOKEN_TTL_SECONDS as i64,
        })
    }

    /// Mint a token valid for one lifetime starting now.
    #[instrument(skip_all)]
    pub fn create(&self, user_id: i64, name: &str, scopes: &str) -> Result<String, IssuerError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            user_id,
            name: name.to_string(),
            scopes: scopes.to_string(),
            iat: now,
            exp: now + self.lifetime_seconds,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with the codec's key.
    #[instrument(skip_all)]
    pub fn sign(&self, claims: &AccessClaims) -> Result<String, IssuerError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| IssuerError::Signing(format!("JWT signing operation failed: {}", e)))
    }

    /// Check size, signature and expiry; return the claims.
    ///
    /// Completeness of the claims is NOT checked here.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<AccessClaims, VerificationError> {
        if !within_size_limit(token) {
            return Err(VerificationError::TooLarge);
        }

        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let kind = match e.kind() {
                    ErrorKind::ExpiredSignature => VerificationError::Expired,
                    ErrorKind::InvalidSignature => VerificationError::BadSignature,
                    _ => VerificationError::Malformed,
                };
                tracing::debug!(target: "issuer.crypto", error = %e, kind = kind.as_str(), "Token verification failed");
                kind
            })
    }
}

/// Global-salt password digest.
pub struct PasswordDigest {
    salt: SecretBox<Vec<u8>>,
}

impl Clone for PasswordDigest {
    fn clone(&self) -> Self {
        Self {
            salt: SecretBox::new(Box::new(self.salt.expose_secret().clone())),
        }
    }
}

impl PasswordDigest {
    pub fn new(salt: SecretBox<Vec<u8>>) -> Self {
        Self { salt }
    }

    /// Hex-encoded `MD5(salt || password)`.
    #[instrument(skip_all)]
    pub fn digest(&self, password: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.salt.expose_secret());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a password against a stored verifier.
    #[instrument(skip_all)]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let computed = self.digest(password);
        if computed.len() != stored.len() {
            return false;
        }
        computed
            .bytes()
            .zip(stored.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
