use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no user with id {0}")]
    NotFound(i32),

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Sole gateway to user records. No business logic lives here.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up at most one user by exact email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record; the store assigns id and timestamps.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Apply the given fields to the record matching `id`.
    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password, image, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password, image, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                image = COALESCE($4, image),
                updated_at = now()
            WHERE id = $1
            RETURNING id, email, name, password, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_err)?;
        user.ok_or(StoreError::NotFound(id))
    }
}

// The unique index on users.email is the final arbiter when two writers
// race past the service-level check; surface it as its own error kind so
// the service can translate it.
fn map_write_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            StoreError::UniqueViolation(db.message().to_string())
        }
        _ => StoreError::Database(e),
    }
}
