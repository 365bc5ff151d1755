use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,                    // store-assigned, immutable
    pub email: String,              // unique across all users
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,           // Argon2 hash, not exposed in JSON
    pub image: Option<String>,      // avatar URI
    pub created_at: OffsetDateTime, // owned by the store
    pub updated_at: OffsetDateTime, // owned by the store
}

/// Fields required to insert a user. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}
