use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{NewUser, UserPatch, UserRecord, UserStore};
use crate::error::{AppError, DatabaseError};

/// Process-local user store
///
/// Enforces the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unique(
        users: &HashMap<Uuid, UserRecord>,
        id: Uuid,
        email: &str,
        username: &str,
    ) -> Result<(), AppError> {
        let taken = users
            .values()
            .any(|u| u.id != id && (u.email == email || u.username == username));
        if taken {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email or username already registered".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

fn not_found() -> AppError {
    DatabaseError::NotFound("User not found".to_string()).into()
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.read().values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let record = user.into_record();
        let mut users = self.users.write();
        Self::ensure_unique(&users, record.id, &record.email, &record.username)?;
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<UserRecord, AppError> {
        let mut users = self.users.write();
        let mut record = users.get(&id).cloned().ok_or_else(not_found)?;
        patch.apply_to(&mut record);
        Self::ensure_unique(&users, id, &record.email, &record.username)?;
        users.insert(id, record.clone());
        Ok(record)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<UserRecord, AppError> {
        let mut users = self.users.write();
        let record = users.get_mut(&id).ok_or_else(not_found)?;
        record.is_active = is_active;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }
}
