use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::auth::password::hash_password;
use crate::users::error::UserError;
use crate::users::repo::{StoreError, UserStore};
use crate::users::repo_types::{NewUser, User, UserChanges};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_uri(uri: &str) -> bool {
    lazy_static! {
        static ref URI_RE: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$").unwrap();
    }
    URI_RE.is_match(uri)
}

#[derive(Debug)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct UpdateUserParams {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

pub async fn create_user(
    store: &dyn UserStore,
    params: CreateUserParams,
) -> Result<User, UserError> {
    validate_unique_email(store, &params.email, None).await?;

    let hashed = hash_password(&params.password)?;
    let user = store
        .create(NewUser {
            name: params.name,
            email: params.email,
            password: hashed,
        })
        .await
        .map_err(into_domain_err)?;

    Ok(user)
}

pub async fn update_user(
    store: &dyn UserStore,
    params: UpdateUserParams,
) -> Result<User, UserError> {
    // Absent email means "no change requested": the uniqueness check is
    // skipped and the stored email stays as is.
    if let Some(email) = params.email.as_deref() {
        validate_unique_email(store, email, Some(params.id)).await?;
    }

    let user = store
        .update(
            params.id,
            UserChanges {
                name: params.name,
                email: params.email,
                image: params.image,
            },
        )
        .await
        .map_err(into_domain_err)?;

    Ok(user)
}

/// A record owning `email` is a conflict unless it is the record named by
/// `exclude_id`. Creation passes `None`: any existing owner conflicts.
async fn validate_unique_email(
    store: &dyn UserStore,
    email: &str,
    exclude_id: Option<i32>,
) -> Result<(), UserError> {
    match store.find_by_email(email).await? {
        Some(owner) if Some(owner.id) != exclude_id => {
            warn!(email = %email, owner_id = owner.id, "email already taken");
            Err(UserError::DuplicatedEmail)
        }
        _ => Ok(()),
    }
}

// The unique index on users.email is the second line of defense against
// the check-then-write race; its violation is the same domain conflict.
fn into_domain_err(e: StoreError) -> UserError {
    match e {
        StoreError::UniqueViolation(_) => UserError::DuplicatedEmail,
        other => UserError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::users::memory::MemoryUserStore;

    fn create_params(name: &str, email: &str, password: &str) -> CreateUserParams {
        CreateUserParams {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_returns_record() {
        let store = MemoryUserStore::new();
        let user = create_user(&store, create_params("alice", "a@x.com", "secret1"))
            .await
            .expect("create");
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "alice");
        assert_ne!(user.password, "secret1");
        assert!(verify_password("secret1", &user.password).expect("verify"));
    }

    #[tokio::test]
    async fn create_rejects_taken_email() {
        let store = MemoryUserStore::new();
        create_user(&store, create_params("alice", "a@x.com", "secret1"))
            .await
            .expect("first create");
        let err = create_user(&store, create_params("mallory", "a@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::DuplicatedEmail));

        // the original record is untouched
        let owner = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(owner.id, 1);
        assert_eq!(owner.name, "alice");
    }

    #[tokio::test]
    async fn update_keeping_own_email_is_not_a_conflict() {
        let store = MemoryUserStore::new();
        let user = create_user(&store, create_params("bob", "b@x.com", "secret1"))
            .await
            .expect("create");
        let updated = update_user(
            &store,
            UpdateUserParams {
                id: user.id,
                name: Some("bob2".into()),
                email: Some("b@x.com".into()),
                image: None,
            },
        )
        .await
        .expect("update");
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.name, "bob2");
        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.image, None);
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let store = MemoryUserStore::new();
        create_user(&store, create_params("alice", "a@x.com", "secret1"))
            .await
            .expect("create alice");
        let bob = create_user(&store, create_params("bob", "b@x.com", "secret2"))
            .await
            .expect("create bob");
        let err = update_user(
            &store,
            UpdateUserParams {
                id: bob.id,
                name: None,
                email: Some("a@x.com".into()),
                image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UserError::DuplicatedEmail));
    }

    #[tokio::test]
    async fn update_without_email_skips_the_check_and_keeps_it() {
        let store = MemoryUserStore::new();
        let user = create_user(&store, create_params("carol", "c@x.com", "secret1"))
            .await
            .expect("create");
        let updated = update_user(
            &store,
            UpdateUserParams {
                id: user.id,
                name: Some("caroline".into()),
                email: None,
                image: None,
            },
        )
        .await
        .expect("update");
        assert_eq!(updated.email, "c@x.com");
        assert_eq!(updated.name, "caroline");
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_store_error() {
        let store = MemoryUserStore::new();
        let err = update_user(
            &store,
            UpdateUserParams {
                id: 99,
                name: Some("ghost".into()),
                email: None,
                image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UserError::Store(StoreError::NotFound(99))));
    }

    #[tokio::test]
    async fn store_level_unique_violation_becomes_the_domain_conflict() {
        // Simulates the loser of the check-then-write race: the record
        // appears after the service-level check would have passed.
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                name: "alice".into(),
                email: "a@x.com".into(),
                password: "hash".into(),
            })
            .await
            .expect("seed");
        let err = store
            .create(NewUser {
                name: "mallory".into(),
                email: "a@x.com".into(),
                password: "hash".into(),
            })
            .await
            .map_err(into_domain_err)
            .unwrap_err();
        assert!(matches!(err, UserError::DuplicatedEmail));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn uri_shapes() {
        assert!(is_valid_uri("https://cdn.example.com/avatar.png"));
        assert!(is_valid_uri("s3://bucket/key"));
        assert!(!is_valid_uri("avatar.png"));
        assert!(!is_valid_uri("http://with space"));
    }
}
