//! Timeline endpoint.
//!
//! GET /api/v1/timeline?path=<file>
//!
//! Returns every revision of the file, oldest first, with reconstructed and
//! highlighted source per revision. Assembly runs on the blocking pool; if
//! the client goes away the request future is dropped and outstanding
//! per-revision work is cancelled.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::Timeline;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/timeline", get(get_timeline))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    path: String,
}

async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Timeline>> {
    let file = state.resolve(&query.path)?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let assembler = state.assembler.clone();
    let token = cancel.clone();
    let timeline = tokio::task::spawn_blocking(move || assembler.assemble_with_cancel(&file, &token))
        .await
        .map_err(|e| AppError::Internal(format!("Timeline task failed: {}", e)))??;

    Ok(Json(timeline))
}
