use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AlbumId, ArtistId, DetailResponse, PlayableItem, PlaylistId, PodcastId, TrackId},
    routes::AppState,
};

pub async fn track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TrackId>,
) -> AppResult<Json<PlayableItem>> {
    let track = state
        .store
        .track(id)
        .await?
        .ok_or_else(|| AppError::not_found("Track", id))?;
    Ok(Json(PlayableItem::from(&track)))
}

pub async fn playlist_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PlaylistId>,
) -> AppResult<Json<DetailResponse>> {
    Ok(Json(state.details.playlist(id).await?))
}

pub async fn album_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlbumId>,
) -> AppResult<Json<DetailResponse>> {
    Ok(Json(state.details.album(id).await?))
}

pub async fn artist_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ArtistId>,
) -> AppResult<Json<DetailResponse>> {
    Ok(Json(state.details.artist(id).await?))
}

pub async fn podcast_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PodcastId>,
) -> AppResult<Json<DetailResponse>> {
    Ok(Json(state.details.podcast(id).await?))
}
