/// User persistence
///
/// The auth core only reads credential records by identity key; the
/// registration and profile routes also create and patch them.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Stored credential record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a record about to be created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub is_superuser: bool,
}

impl NewUser {
    fn into_record(self) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            password_hash: self.password_hash,
            is_active: true,
            is_superuser: self.is_superuser,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: only the fields that are `Some` are applied
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.full_name.is_none()
    }

    /// Merge into `record` field by field, bumping `updated_at`
    pub fn apply_to(self, record: &mut UserRecord) {
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(username) = self.username {
            record.username = username;
        }
        if let Some(full_name) = self.full_name {
            record.full_name = Some(full_name);
        }
        record.updated_at = Utc::now();
    }
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup by identity key
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` if email or username is taken
    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// # Errors
    /// - `DatabaseError::NotFound` if no record has this id
    /// - `DatabaseError::UniqueConstraintViolation` if the patch collides
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<UserRecord, AppError>;

    /// # Errors
    /// `DatabaseError::NotFound` if no record has this id
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<UserRecord, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        NewUser {
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            full_name: None,
            password_hash: "hash".to_string(),
            is_superuser: false,
        }
        .into_record()
    }

    #[test]
    fn test_new_user_is_active() {
        let user = record();
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_patch_applies_only_provided_fields() {
        let mut user = record();
        let patch = UserPatch {
            full_name: Some("Alice Liddell".to_string()),
            ..UserPatch::default()
        };
        assert!(!patch.is_empty());

        patch.apply_to(&mut user);

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.username, "alice");
        assert_eq!(user.full_name.as_deref(), Some("Alice Liddell"));
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let user = record();
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_response_renders_id_and_timestamps_as_strings() {
        let user = record();
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(json["id"], user.id.to_string());
        let created_at: DateTime<Utc> = json["created_at"].as_str().unwrap().parse().unwrap();
        assert_eq!(created_at, user.created_at);
    }
}
