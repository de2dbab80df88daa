use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::RequestId, models::SearchEnvelope, routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for the federated search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchEnvelope>> {
    tracing::info!(request_id = %request_id, query = %params.q, "Processing search request");

    let envelope = state.search.search(&params.q).await?;
    Ok(Json(envelope))
}
