//! # Issuer Test Utilities
//!
//! Shared test utilities for the token issuer.
//!
//! This crate provides:
//! - Fixed secrets and a ready-made `Config` (`fixtures`)
//! - An in-memory user repository (`InMemoryUserRepository`)
//! - Token builders for forging tokens with chosen claims (`TestTokenBuilder`)
//! - Server test harness (`TestIssuerServer`) over in-memory stores
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use issuer_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestIssuerServer::spawn().await?;
//!     let user = server.register_user("alice", "p", None).await?;
//!     let token = server.issue_token(user.user_id, "p").await?;
//!
//!     token.assert_valid_jwt().assert_for_user(user.user_id);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod memory_users;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use memory_users::*;
pub use server_harness::*;
pub use token_builders::*;
