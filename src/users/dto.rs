use serde::{Deserialize, Serialize};

/// Request body for account creation. Fields are optional at the serde
/// level so that shape failures surface as 400, not as a deserializer
/// rejection.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for profile updates; at least one field must be given.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Response for a freshly created account. No image yet, never a password.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// Public projection of a user returned by the update endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub image: Option<String>,
    pub email: String,
    pub name: String,
}
