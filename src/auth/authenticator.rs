/// Credential Authentication
///
/// Resolves an identity by email and checks the presented password.

use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AuthError};
use crate::store::{UserRecord, UserStore};

/// Plaintext behind the hash checked when the email is unknown
const DUMMY_PASSWORD: &str = "mindgarden-unknown-identity";

#[derive(Clone)]
pub struct CredentialAuthenticator {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    /// Hashed at the configured cost so both failure paths pay for one bcrypt run
    dummy_hash: String,
}

impl CredentialAuthenticator {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to prepare dummy password hash");
            String::new()
        });
        Self {
            store,
            hasher,
            dummy_hash,
        }
    }

    /// Look up `email` and verify `password` against the stored hash
    ///
    /// The active flag is not checked here; callers decide what an inactive
    /// account means for them.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` for an unknown email or wrong password
    /// - Store errors are propagated unchanged
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, AppError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // Same bcrypt work as a real mismatch
                self.hasher.verify(password, &self.dummy_hash);
                tracing::debug!("Authentication failed: unknown identity");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Authentication failed: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}
