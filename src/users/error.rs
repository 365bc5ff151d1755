use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::users::repo::StoreError;

/// Failures surfaced by the account operations. Handlers map these to
/// HTTP statuses by matching the variant, never the message.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("There is already an user with given email")]
    DuplicatedEmail,

    #[error("{0}")]
    InvalidData(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicatedEmail => StatusCode::CONFLICT,
            Self::InvalidData(_) | Self::Store(_) | Self::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::DuplicatedEmail => "DuplicatedEmailError",
            Self::InvalidData(_) => "InvalidDataError",
            Self::Store(StoreError::NotFound(_)) => "NotFoundError",
            Self::Store(_) => "StoreError",
            Self::Internal(_) => "Error",
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            name: self.name().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
