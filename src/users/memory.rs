use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::users::repo::{StoreError, UserStore};
use crate::users::repo_types::{NewUser, User, UserChanges};

/// In-process store behind the same trait as Postgres, emulating the
/// serial id sequence and the unique index on email.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    users: HashMap<i32, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(format!(
                "duplicate key value on users.email: {}",
                user.email
            )));
        }
        inner.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: inner.next_id,
            email: user.email,
            name: user.name,
            password: user.password,
            image: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(email) = changes.email.as_deref() {
            if inner.users.values().any(|u| u.email == email && u.id != id) {
                return Err(StoreError::UniqueViolation(format!(
                    "duplicate key value on users.email: {}",
                    email
                )));
            }
        }
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(image) = changes.image {
            user.image = Some(image);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}
