//! User store access.
//!
//! Services depend on [`UserRepository`] rather than a pool so the HTTP
//! layer can be tested against an in-memory implementation.

pub mod users;

pub use users::PgUserRepository;

use crate::errors::IssuerError;
use crate::models::User;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored row with its assigned id.
    async fn create_user(
        &self,
        name: &str,
        password_digest: &str,
        scopes: &str,
    ) -> Result<User, IssuerError>;

    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, IssuerError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), IssuerError>;
}
