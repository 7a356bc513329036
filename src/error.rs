use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::clickup::ClientError;
use crate::config::ConfigError;

/// Setup failures that stop a run before any step executes.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the stub API, rendered in ClickUp's `{"err", "ECODE"}` shape.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token invalid")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Tag already exists: {0}")]
    DuplicateTag(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Stub state unavailable")]
    Internal,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "OAUTH_025",
            AppError::NotFound(_) => "ITEM_013",
            AppError::DuplicateTag(_) => "TAGS_001",
            AppError::BadRequest(_) => "INPUT_005",
            AppError::Internal => "STUB_500",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateTag(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("{}", self);
        let body = json!({ "err": self.to_string(), "ECODE": self.code() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
