/// Session Issuance
///
/// Login and refresh. Both mint a fresh access/refresh pair; refresh never
/// echoes the submitted token back.
///
/// There is no revocation store: a superseded refresh token keeps verifying
/// until the signing secret changes, so rotation is advisory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::authenticator::CredentialAuthenticator;
use crate::auth::jwt::TokenCodec;
use crate::error::{AppError, AuthError};
use crate::store::{UserRecord, UserStore};

pub const TOKEN_TYPE: &str = "bearer";

/// Token pair returned to clients
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct SessionIssuer {
    authenticator: CredentialAuthenticator,
    codec: TokenCodec,
    store: Arc<dyn UserStore>,
    access_ttl: chrono::Duration,
}

impl SessionIssuer {
    pub fn new(
        authenticator: CredentialAuthenticator,
        codec: TokenCodec,
        store: Arc<dyn UserStore>,
        access_ttl: chrono::Duration,
    ) -> Self {
        Self {
            authenticator,
            codec,
            store,
            access_ttl,
        }
    }

    /// Exchange credentials for a token pair
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials`: unknown email or wrong password
    /// - `AuthError::InactiveAccount`: correct password, deactivated account
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        let user = self.authenticator.authenticate(email, password).await?;

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Login attempt on inactive account");
            return Err(AuthError::InactiveAccount.into());
        }

        let tokens = self.issue_pair(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The identity is looked up again so deactivation is honoured.
    ///
    /// # Errors
    /// - `AuthError::InvalidToken`: refresh token failed verification
    /// - `AuthError::UnknownOrInactiveIdentity`: subject missing or deactivated
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let subject = self.codec.verify_refresh(refresh_token)?;

        let user = match self.store.find_by_email(&subject).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::warn!("Refresh for unknown or inactive identity");
                return Err(AuthError::UnknownOrInactiveIdentity.into());
            }
        };

        let tokens = self.issue_pair(&user)?;
        tracing::info!(user_id = %user.id, "Token pair rotated");
        Ok(tokens)
    }

    fn issue_pair(&self, user: &UserRecord) -> Result<TokenResponse, AppError> {
        Ok(TokenResponse {
            access_token: self.codec.issue_access(&user.email, self.access_ttl)?,
            refresh_token: self.codec.issue_refresh(&user.email)?,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordHasher;
    use crate::configuration::{JwtSettings, PasswordSettings};
    use crate::store::{InMemoryUserStore, NewUser};

    struct Fixture {
        issuer: SessionIssuer,
        codec: TokenCodec,
        store: Arc<InMemoryUserStore>,
    }

    async fn setup() -> Fixture {
        let jwt = JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "test".to_string(),
            access_token_expiry: 900,
        };
        let hasher = PasswordHasher::new(PasswordSettings { bcrypt_cost: 4 });
        let store = Arc::new(InMemoryUserStore::new());
        store
            .insert(NewUser {
                email: "a@x.com".to_string(),
                username: "alice".to_string(),
                full_name: None,
                password_hash: hasher.hash("secret123").unwrap(),
                is_superuser: false,
            })
            .await
            .unwrap();

        let codec = TokenCodec::new(&jwt);
        let issuer = SessionIssuer::new(
            CredentialAuthenticator::new(store.clone(), hasher),
            codec.clone(),
            store.clone(),
            jwt.access_token_ttl(),
        );

        Fixture {
            issuer,
            codec,
            store,
        }
    }

    async fn deactivate(store: &InMemoryUserStore, email: &str) {
        let user = store.find_by_email(email).await.unwrap().unwrap();
        store.set_active(user.id, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_issues_token_pair() {
        let fx = setup().await;

        let tokens = fx.issuer.login("a@x.com", "secret123").await.unwrap();

        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, 900);
        assert_eq!(fx.codec.verify_access(&tokens.access_token).unwrap(), "a@x.com");
        assert_eq!(fx.codec.verify_refresh(&tokens.refresh_token).unwrap(), "a@x.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let fx = setup().await;

        let err = fx.issuer.login("a@x.com", "wrong-password").await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let fx = setup().await;
        deactivate(&fx.store, "a@x.com").await;

        let err = fx.issuer.login("a@x.com", "secret123").await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::InactiveAccount));
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let fx = setup().await;
        let first = fx.issuer.login("a@x.com", "secret123").await.unwrap();

        let second = fx.issuer.refresh(&first.refresh_token).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);
        assert_eq!(fx.codec.verify_access(&second.access_token).unwrap(), "a@x.com");
    }

    #[tokio::test]
    async fn test_superseded_refresh_token_still_verifies() {
        let fx = setup().await;
        let first = fx.issuer.login("a@x.com", "secret123").await.unwrap();
        fx.issuer.refresh(&first.refresh_token).await.unwrap();

        // No revocation store exists, so the old token is still accepted
        assert!(fx.issuer.refresh(&first.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_with_tampered_token() {
        let fx = setup().await;
        let tokens = fx.issuer.login("a@x.com", "secret123").await.unwrap();

        let tampered = format!("{}X", tokens.refresh_token);
        let err = fx.issuer.refresh(&tampered).await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let fx = setup().await;
        let tokens = fx.issuer.login("a@x.com", "secret123").await.unwrap();

        let err = fx.issuer.refresh(&tokens.access_token).await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_refresh_for_inactive_identity() {
        let fx = setup().await;
        let tokens = fx.issuer.login("a@x.com", "secret123").await.unwrap();
        deactivate(&fx.store, "a@x.com").await;

        let err = fx.issuer.refresh(&tokens.refresh_token).await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::UnknownOrInactiveIdentity));
    }

    #[tokio::test]
    async fn test_refresh_for_unknown_identity() {
        let fx = setup().await;
        let orphan = fx.codec.issue_refresh("ghost@x.com").unwrap();

        let err = fx.issuer.refresh(&orphan).await.unwrap_err();

        assert_eq!(err.auth_error(), Some(AuthError::UnknownOrInactiveIdentity));
    }
}
