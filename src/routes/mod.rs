//! API route handlers for serve mode.
//!
//! Each submodule defines routes for a feature area:
//! - `timeline`: Timeline for one file (GET /api/v1/timeline)
//! - `repository`: Enclosing repository info (GET /api/v1/repository)
//!
//! Request paths are resolved against the served root and may not escape it.

pub mod repository;
pub mod timeline;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::timeline::TimelineAssembler;

#[derive(Clone)]
pub struct AppState {
    /// Canonical directory whose files may be requested
    pub root: PathBuf,
    pub assembler: Arc<TimelineAssembler>,
}

impl AppState {
    /// Resolve a request path (relative to the served root, or absolute) to
    /// a canonical path inside the root.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let resolved = self
            .root
            .join(raw)
            .canonicalize()
            .map_err(|_| AppError::InvalidPath(raw.to_string()))?;

        if !resolved.starts_with(&self.root) {
            tracing::warn!("Refusing path outside served root: {}", raw);
            return Err(AppError::InvalidPath(raw.to_string()));
        }

        Ok(resolved)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(timeline::routes(state.clone()))
        .merge(repository::routes(state))
}
