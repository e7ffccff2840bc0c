/// Request Authorization
///
/// Per-request gate: bearer token, signature and expiry, fresh identity
/// lookup, then the optional active and superuser predicates. The first
/// failing step ends the request.

use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::error::{AppError, AuthError};
use crate::store::{UserRecord, UserStore};

/// Which identity predicates an endpoint requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub require_active: bool,
    pub require_superuser: bool,
}

impl AccessPolicy {
    /// Any identity the token resolves to
    pub const AUTHENTICATED: Self = Self {
        require_active: false,
        require_superuser: false,
    };

    pub const ACTIVE: Self = Self {
        require_active: true,
        require_superuser: false,
    };

    pub const SUPERUSER: Self = Self {
        require_active: false,
        require_superuser: true,
    };
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

#[derive(Clone)]
pub struct RequestAuthorizer {
    codec: TokenCodec,
    store: Arc<dyn UserStore>,
}

impl RequestAuthorizer {
    pub fn new(codec: TokenCodec, store: Arc<dyn UserStore>) -> Self {
        Self { codec, store }
    }

    /// Resolve the caller behind `authorization` and enforce `policy`
    ///
    /// The identity is always re-read from the store, never taken from the
    /// token, so deactivation applies to tokens that are still valid.
    ///
    /// # Errors
    /// - `AuthError::Unauthenticated`: no bearer token, token invalid or
    ///   expired, or subject not found
    /// - `AuthError::InactiveAccount`: policy requires an active account
    /// - `AuthError::InsufficientPrivilege`: policy requires a superuser
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        policy: AccessPolicy,
    ) -> Result<UserRecord, AppError> {
        let token = authorization.and_then(extract_bearer).ok_or_else(|| {
            tracing::warn!("Missing or malformed Authorization header");
            AuthError::Unauthenticated
        })?;

        let subject = self
            .codec
            .verify_access(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let user = self.store.find_by_email(&subject).await?.ok_or_else(|| {
            tracing::warn!("Access token subject no longer exists");
            AuthError::Unauthenticated
        })?;

        if policy.require_active && !user.is_active {
            tracing::warn!(user_id = %user.id, "Request from inactive account");
            return Err(AuthError::InactiveAccount.into());
        }

        if policy.require_superuser && !user.is_superuser {
            tracing::warn!(user_id = %user.id, "Superuser endpoint denied");
            return Err(AuthError::InsufficientPrivilege.into());
        }

        tracing::debug!(user_id = %user.id, "Request authorized");
        Ok(user)
    }
}
