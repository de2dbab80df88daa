use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PlaylistId, PlaylistSummary, TrackId, UserId},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: TrackId,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub track_ids: Vec<TrackId>,
}

pub async fn recent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<PlaylistSummary>>> {
    Ok(Json(state.playlists.recent(user_id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Json(request): Json<CreatePlaylistRequest>,
) -> AppResult<(StatusCode, Json<PlaylistSummary>)> {
    tracing::info!(request_id = %request_id, user_id, "Creating playlist");

    let summary = state
        .playlists
        .create(user_id, &request.title, request.cover.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PlaylistId>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> AppResult<StatusCode> {
    state
        .playlists
        .update(id, request.title, request.cover)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PlaylistId>,
    Json(request): Json<AddTrackRequest>,
) -> AppResult<StatusCode> {
    state.playlists.add_track(id, request.track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_track(
    State(state): State<Arc<AppState>>,
    Path((id, track_id)): Path<(PlaylistId, TrackId)>,
) -> AppResult<StatusCode> {
    state.playlists.remove_track(id, track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<PlaylistId>,
    Json(request): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        playlist_id = id,
        track_count = request.track_ids.len(),
        "Reordering playlist"
    );

    state.playlists.reorder(id, &request.track_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
