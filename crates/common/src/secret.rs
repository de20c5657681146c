//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] crate types. Passwords arriving in request
//! bodies, the token signing secret and the password digest salt are all held
//! in these wrappers so that `{:?}` and `tracing` fields can never print them.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct TokenRequest {
//!     user_id: i64,
//!     password: SecretString,
//! }
//!
//! let req = TokenRequest {
//!     user_id: 7,
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // Debug output redacts the password
//! println!("{:?}", req);
//!
//! // Reading the value requires an explicit call
//! let password: &str = req.password.expose_secret();
//! ```
//!
//! Use `SecretString` for passwords and bearer tokens, `SecretBox<Vec<u8>>`
//! for binary key material such as the HMAC signing secret.
//!
//! # Serde Integration
//!
//! With the `serde` feature enabled, secrets deserialize directly from JSON:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct RegisterUser {
//!     name: String,
//!     password: SecretString,
//! }
//!
//! let json = r#"{"name": "alice", "password": "p"}"#;
//! let body: RegisterUser = serde_json::from_str(json).unwrap();
//! println!("{:?}", body);
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
