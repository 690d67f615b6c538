//! Repository info endpoint.
//!
//! GET /api/v1/repository?path=<file-or-dir>
//!
//! Returns the repository enclosing `path`: root, head branch and commit,
//! and whether the working tree is clean enough to build a timeline.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::GitRepository;
use crate::models::RepositoryInfo;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository", get(get_repository_info))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepositoryQuery {
    #[serde(default)]
    path: String,
}

async fn get_repository_info(
    State(state): State<AppState>,
    Query(query): Query<RepositoryQuery>,
) -> Result<Json<RepositoryInfo>> {
    let target = state.resolve(&query.path)?;
    let repo = GitRepository::discover(&target)?;
    let info = repo.info()?;
    Ok(Json(info))
}
