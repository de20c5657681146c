//! In-memory user repository.

use async_trait::async_trait;
use chrono::Utc;
use issuer_service::errors::IssuerError;
use issuer_service::models::User;
use issuer_service::repositories::UserRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Vec-backed `UserRepository` with sequential ids starting at 1.
///
/// [`InMemoryUserRepository::set_failing`] turns every call into a database
/// error, for exercising 500 paths.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
    failing: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), IssuerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IssuerError::Database("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(
        &self,
        name: &str,
        password_digest: &str,
        scopes: &str,
    ) -> Result<User, IssuerError> {
        self.check()?;
        let mut rows = self.rows.lock().map_err(|_| IssuerError::Internal)?;
        let user = User {
            user_id: rows.len() as i64 + 1,
            name: name.to_string(),
            password_digest: password_digest.to_string(),
            scopes: scopes.to_string(),
            created_at: Utc::now(),
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, IssuerError> {
        self.check()?;
        let rows = self.rows.lock().map_err(|_| IssuerError::Internal)?;
        Ok(rows.iter().find(|user| user.user_id == user_id).cloned())
    }

    async fn ping(&self) -> Result<(), IssuerError> {
        self.check()
    }
}
