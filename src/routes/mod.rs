use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        activity::ActivityLog, detail::DetailAssembler, library::LibraryService,
        playlists::PlaylistService,
        recommendations::{RecommendationMode, Recommender},
        search::SearchFederator,
    },
    store::CatalogStore,
};

pub mod activity;
pub mod catalog;
pub mod playlists;
pub mod recommendations;
pub mod search;
pub mod users;

/// Shared handler state
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub recommender: Recommender,
    pub default_mode: RecommendationMode,
    pub activity: ActivityLog,
    pub search: SearchFederator,
    pub details: DetailAssembler,
    pub playlists: PlaylistService,
    pub library: LibraryService,
    pub feed_size: usize,
    pub feed_oversample: u32,
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Wires every service onto the same store
    pub fn new(store: Arc<dyn CatalogStore>, config: &Config) -> Self {
        Self {
            recommender: Recommender::new(store.clone(), config.randomness()),
            default_mode: config.recommendation_mode,
            activity: ActivityLog::new(store.clone()),
            search: SearchFederator::new(store.clone()).with_limit(config.search_limit),
            details: DetailAssembler::new(store.clone()),
            playlists: PlaylistService::new(store.clone()),
            library: LibraryService::new(store.clone()),
            feed_size: config.feed_size,
            feed_oversample: config.feed_window(),
            cors_origins: config.cors_origin_list(),
            store,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search::search))
        .route("/tracks/:id", get(catalog::track))
        .route("/albums/:id", get(catalog::album_detail))
        .route("/artists/:id", get(catalog::artist_detail))
        .route("/podcasts/:id", get(catalog::podcast_detail))
        .route("/playlists/:id", get(catalog::playlist_detail))
        .route("/playlists/:id", put(playlists::update))
        .route("/playlists/:id/tracks", post(playlists::add_track))
        .route("/playlists/:id/tracks/:track_id", delete(playlists::remove_track))
        .route("/playlists/:id/reorder", put(playlists::reorder))
        .route("/users/:user_id", get(users::profile))
        .route("/users/:user_id/library", get(users::library))
        .route("/users/:user_id/recommendations", get(recommendations::recommend))
        .route("/users/:user_id/plays", post(activity::record_play))
        .route("/users/:user_id/recent", get(activity::recent_feed))
        .route("/users/:user_id/recent-tracks", get(activity::recent_tracks))
        .route("/users/:user_id/playlists", post(playlists::create))
        .route("/users/:user_id/playlists/recent", get(playlists::recent))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let mut parsed = Vec::new();
    for origin in origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(e) => tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(parsed)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
