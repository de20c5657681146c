//! Fixed secrets and configuration for tests.

use common::secret::SecretBox;
use issuer_service::config::{Config, RotationPolicy, DEFAULT_DB_MAX_CONNECTIONS};

/// HMAC secret every test server signs with.
pub const TEST_SIGNING_SECRET: &[u8] = b"test-signing-secret-0123456789abcdef";

/// Password digest salt every test server uses.
pub const TEST_HASH_SALT: &[u8] = b"test-hash-salt";

/// Configuration for an in-process test server.
///
/// Store URLs are placeholders; the harness injects in-memory stores.
pub fn test_config(rotation_policy: RotationPolicy) -> Config {
    Config {
        database_url: String::new(),
        db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        redis_url: None,
        bind_address: "127.0.0.1:0".to_string(),
        signing_secret: SecretBox::new(Box::new(TEST_SIGNING_SECRET.to_vec())),
        hash_salt: SecretBox::new(Box::new(TEST_HASH_SALT.to_vec())),
        rotation_policy,
        json_logs: false,
    }
}
