/// JWT Token Codec
///
/// Issues and verifies signed tokens. Keys come from `JwtSettings` at
/// construction and are never mutated afterwards.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenPurpose};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue an access token for `subject` that lapses after `ttl`
    ///
    /// # Errors
    /// Returns error if token encoding fails
    pub fn issue_access(&self, subject: &str, ttl: chrono::Duration) -> Result<String, AppError> {
        self.sign(&Claims::access(subject, ttl, &self.issuer))
    }

    /// Issue a refresh token for `subject` (no expiry claim)
    ///
    /// # Errors
    /// Returns error if token encoding fails
    pub fn issue_refresh(&self, subject: &str) -> Result<String, AppError> {
        self.sign(&Claims::refresh(subject, &self.issuer))
    }

    /// Verify an access token and return its subject
    ///
    /// Malformed encoding, a bad signature, a wrong issuer or purpose, and an
    /// elapsed expiry all yield the same `AuthError::InvalidToken`.
    pub fn verify_access(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.verify(token, TokenPurpose::Access)?;
        if claims.is_expired() {
            tracing::debug!("Access token expired");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.sub)
    }

    /// Verify a refresh token and return its subject
    ///
    /// Only signature, issuer and purpose are checked.
    pub fn verify_refresh(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token, TokenPurpose::Refresh).map(|claims| claims.sub)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        // `exp` is checked when present; refresh tokens carry none
        validation.set_required_spec_claims(&["iss"]);
        validation.validate_exp = purpose == TokenPurpose::Access;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "JWT validation error");
                AuthError::InvalidToken
            })?;

        if claims.purpose != purpose {
            tracing::warn!(
                expected = ?purpose,
                actual = ?claims.purpose,
                "JWT presented for the wrong purpose"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
