use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PlayableItem, UserId},
    routes::AppState,
    services::recommendations::RecommendationMode,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub mode: Option<RecommendationMode>,
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<PlayableItem>>> {
    let mode = params.mode.unwrap_or(state.default_mode);

    tracing::info!(
        request_id = %request_id,
        user_id,
        mode = ?mode,
        "Processing recommendation request"
    );

    let recommendation = state.recommender.recommend(user_id, mode).await?;

    tracing::info!(
        request_id = %request_id,
        tier = ?recommendation.tier,
        count = recommendation.tracks.len(),
        "Recommendations completed"
    );

    Ok(Json(
        recommendation
            .tracks
            .iter()
            .map(PlayableItem::from)
            .collect(),
    ))
}
