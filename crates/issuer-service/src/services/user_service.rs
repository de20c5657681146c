//! User registration and credential verification.

use crate::crypto::PasswordDigest;
use crate::errors::IssuerError;
use crate::models::{RegisterUserRequest, User, VerifiedIdentity};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_registration;
use crate::repositories::UserRepository;
use common::secret::ExposeSecret;
use tracing::instrument;

/// Register a user.
///
/// Missing or empty scopes become `"user"`. The password is stored only as
/// its salted digest.
#[instrument(skip_all)]
pub async fn register_user(
    users: &dyn UserRepository,
    digest: &PasswordDigest,
    request: RegisterUserRequest,
) -> Result<User, IssuerError> {
    let scopes = request.effective_scopes().to_string();
    let password_digest = digest.digest(request.password.expose_secret());

    let result = users
        .create_user(&request.name, &password_digest, &scopes)
        .await;

    match &result {
        Ok(user) => {
            record_registration("success");
            tracing::info!(
                target: "issuer.users",
                user = %hash_for_correlation(&user.user_id.to_string()),
                "User registered"
            );
        }
        Err(_) => record_registration("error"),
    }

    result
}

/// Check a user id and password against the user store.
///
/// Unknown user and wrong password both yield `Unauthorized`; callers
/// cannot tell them apart.
#[instrument(skip_all)]
pub async fn verify_credentials(
    users: &dyn UserRepository,
    digest: &PasswordDigest,
    user_id: i64,
    password: &str,
) -> Result<VerifiedIdentity, IssuerError> {
    let Some(user) = users.get_by_id(user_id).await? else {
        tracing::debug!(
            target: "issuer.users",
            user = %hash_for_correlation(&user_id.to_string()),
            "Credential check failed: unknown user"
        );
        return Err(IssuerError::Unauthorized);
    };

    if !digest.verify(password, &user.password_digest) {
        tracing::debug!(
            target: "issuer.users",
            user = %hash_for_correlation(&user_id.to_string()),
            "Credential check failed: password mismatch"
        );
        return Err(IssuerError::Unauthorized);
    }

    Ok(VerifiedIdentity::from(user))
}
