use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewUser, UserPatch, UserRecord, UserStore};
use crate::error::{AppError, DatabaseError};

const USER_COLUMNS: &str = "id, email, username, full_name, password_hash, is_active, \
                            is_superuser, created_at, updated_at";

/// Postgres-backed user store over the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<UserRecord, AppError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()).into())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let record = user.into_record();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, full_name, password_hash,
                               is_active, is_superuser, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.full_name)
        .bind(&record.password_hash)
        .bind(record.is_active)
        .bind(record.is_superuser)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %record.id, "User row inserted");
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<UserRecord, AppError> {
        let mut record = self.find_by_id(id).await?;
        patch.apply_to(&mut record);

        sqlx::query(
            r#"
            UPDATE users
            SET email = $1, username = $2, full_name = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.full_name)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<UserRecord, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET is_active = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::from(DatabaseError::NotFound("User not found".to_string())))?;

        tracing::info!(user_id = %id, is_active, "User active flag changed");
        Ok(user)
    }
}
