use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{LibraryEnvelope, UserId, UserProfile},
    routes::AppState,
};

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .store
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id))?;
    Ok(Json(UserProfile::from(user)))
}

pub async fn library(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<LibraryEnvelope>> {
    let library = state.library.library(user_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id,
        playlists = library.playlists.len(),
        albums = library.albums.len(),
        podcasts = library.podcasts.len(),
        "Library served"
    );

    Ok(Json(library))
}
