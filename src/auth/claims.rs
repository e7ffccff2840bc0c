/// JWT Claims structure
///
/// Payload of every token the service issues. The `type` claim keeps access
/// and refresh tokens apart; `exp` is only present on access tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token may be used for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity key, the user's email)
    pub sub: String,
    /// Purpose tag
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp), absent on refresh tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    /// Claims for a short-lived access token
    pub fn access(subject: &str, ttl: chrono::Duration, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            purpose: TokenPurpose::Access,
            iat: now,
            exp: Some(now + ttl.num_seconds()),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Claims for a refresh token
    ///
    /// No `exp` claim is set: refresh tokens stay valid until the signing
    /// secret changes.
    pub fn refresh(subject: &str, issuer: &str) -> Self {
        Self {
            sub: subject.to_string(),
            purpose: TokenPurpose::Refresh,
            iat: chrono::Utc::now().timestamp(),
            exp: None,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => exp < chrono::Utc::now().timestamp(),
            None => false,
        }
    }
}
