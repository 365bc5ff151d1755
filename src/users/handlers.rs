use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    state::AppState,
    users::{
        dto::{CreateUserRequest, CreatedUserResponse, UpdateUserRequest, UserResponse},
        error::UserError,
        services::{self, is_valid_email, is_valid_uri, CreateUserParams, UpdateUserParams},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user).put(update_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), UserError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed request body");
        UserError::InvalidData(e.body_text())
    })?;

    let name = payload.name.as_deref().unwrap_or("");
    if name.chars().count() < 3 {
        warn!("name too short");
        return Err(UserError::InvalidData(
            "name must be at least 3 characters".into(),
        ));
    }

    let email = payload.email.as_deref().unwrap_or("");
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(UserError::InvalidData("email must be a valid email".into()));
    }

    let password = payload.password.as_deref().unwrap_or("");
    if password.chars().count() < 6 {
        warn!("password too short");
        return Err(UserError::InvalidData(
            "password must be at least 6 characters".into(),
        ));
    }

    let user = services::create_user(
        state.store.as_ref(),
        CreateUserParams {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, UserError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed request body");
        UserError::InvalidData(e.body_text())
    })?;

    if payload.email.is_none() && payload.name.is_none() && payload.image.is_none() {
        warn!(user_id, "update with nothing to update");
        return Err(UserError::InvalidData(
            "at least one of email, name or image must be given".into(),
        ));
    }

    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(UserError::InvalidData("email must be a valid email".into()));
        }
    }
    if let Some(name) = payload.name.as_deref() {
        if name.chars().count() < 3 {
            warn!("name too short");
            return Err(UserError::InvalidData(
                "name must be at least 3 characters".into(),
            ));
        }
    }
    if let Some(image) = payload.image.as_deref() {
        if !is_valid_uri(image) {
            warn!("invalid image uri");
            return Err(UserError::InvalidData("image must be a valid URI".into()));
        }
    }

    let user = services::update_user(
        state.store.as_ref(),
        UpdateUserParams {
            id: user_id,
            name: payload.name,
            email: payload.email,
            image: payload.image,
        },
    )
    .await?;

    info!(user_id = user.id, "user updated");
    Ok(Json(UserResponse {
        id: user.id,
        image: user.image,
        email: user.email,
        name: user.name,
    }))
}
