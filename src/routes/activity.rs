use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{EntityKind, EntityRef, FeedEntry, NewActivity, PlayableItem, UserId},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub context: Option<String>,
}

/// Logs a play. The write happens in the background, so this always answers 202.
pub async fn record_play(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Json(request): Json<PlayRequest>,
) -> AppResult<StatusCode> {
    let kind: EntityKind = request.kind.parse().map_err(AppError::InvalidInput)?;
    let target = EntityRef::new(kind, request.id);

    tracing::info!(
        request_id = %request_id,
        user_id,
        target = ?target,
        "Recording play"
    );

    // Detached; the handle is not awaited
    let _ = state
        .activity
        .record(NewActivity::now(user_id, target, request.context));

    Ok(StatusCode::ACCEPTED)
}

pub async fn recent_feed(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<FeedEntry>>> {
    let feed = state
        .activity
        .feed(user_id, state.feed_size, state.feed_oversample)
        .await?;
    Ok(Json(feed))
}

pub async fn recent_tracks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<PlayableItem>>> {
    let tracks = state.activity.recent_tracks(user_id).await?;
    Ok(Json(tracks))
}
