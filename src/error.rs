//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for every way a timeline can fail and implements
//! Axum's `IntoResponse` so the serve mode converts errors to JSON bodies.
//!
//! Error mappings:
//! - `NotAGitRepository`, `FileNotTracked` → 404
//! - `InvalidPath` → 400
//! - `DirtyWorkingTree` → 409
//! - `Cancelled` → 503
//! - `BlameFailure`, `Git`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Backend query failure (corrupt history, unreadable object store, ...).
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository (or any parent up to the filesystem root): {0}")]
    NotAGitRepository(String),

    #[error(
        "Repository not clean: {0}\n\n\
         It looks like some files in this repository have uncommitted changes.\n\
         Commit or stash them before building a timeline."
    )]
    DirtyWorkingTree(String),

    #[error("File has no history in this repository: {0}")]
    FileNotTracked(String),

    #[error("Could not blame {path} at {revision}: {reason}")]
    BlameFailure {
        path: String,
        revision: String,
        reason: String,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Timeline request was cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAGitRepository(_) | AppError::FileNotTracked(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::DirtyWorkingTree(_) => StatusCode::CONFLICT,
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Git(_) | AppError::BlameFailure { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
