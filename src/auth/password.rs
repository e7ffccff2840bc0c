/// Password Hashing and Verification
///
/// Salted bcrypt hashing with a configurable cost factor.

use crate::configuration::PasswordSettings;
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(settings: PasswordSettings) -> Self {
        Self {
            cost: settings.bcrypt_cost,
        }
    }

    /// Hash a password using bcrypt
    ///
    /// A fresh salt is drawn on every call, so hashing the same plaintext
    /// twice yields different digests.
    ///
    /// # Errors
    /// Returns error if bcrypt hashing fails (e.g. cost out of range)
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    ///
    /// A malformed digest is a mismatch, not an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Password verification against malformed hash");
            false
        })
    }
}
