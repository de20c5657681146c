//! Observability for the token issuer.
//!
//! # Privacy by Default
//!
//! Services instrument with `#[instrument(skip_all)]` and add fields
//! explicitly. Fields fall into three groups:
//! - **SAFE**: enums and outcomes (`outcome`, `policy`, `result`)
//! - **HASHED**: user ids, via [`hash_for_correlation`]
//! - **NEVER**: passwords, tokens, the signing secret, the salt

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated; enough to follow one user through the logs
/// without writing the identifier itself.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}
