use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        AlbumSummary, ArtistSummary, EntityKind, PlayableItem, PlaylistSummary, SearchEnvelope,
    },
    store::{CatalogStore, TrackFilter, TrackOrder},
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Runs one query against tracks, artists, albums and playlists at once
#[derive(Clone)]
pub struct SearchFederator {
    store: Arc<dyn CatalogStore>,
    limit: u32,
}

impl SearchFederator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Per-category cap on returned matches
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Searches all four categories concurrently.
    ///
    /// A category whose scan fails comes back empty and is listed in
    /// `failed`; the call only errors when every category failed.
    pub async fn search(&self, raw_query: &str) -> AppResult<SearchEnvelope> {
        let query = raw_query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query must not be empty".to_string(),
            ));
        }

        tracing::info!(query = %query, limit = self.limit, "Running federated search");

        let (tracks, artists, albums, playlists) = tokio::join!(
            self.store.tracks(
                TrackFilter::TitleOrArtist(query.to_string()),
                TrackOrder::Natural,
                Some(self.limit),
            ),
            self.store.artists_matching(query, self.limit),
            self.store.albums_matching(query, self.limit),
            self.store.playlists_matching(query, self.limit),
        );

        let mut envelope = SearchEnvelope::default();

        match tracks {
            Ok(tracks) => envelope.tracks = tracks.iter().map(PlayableItem::from).collect(),
            Err(e) => record_failure(&mut envelope, EntityKind::Track, &e),
        }
        match artists {
            Ok(artists) => envelope.artists = artists.iter().map(ArtistSummary::from).collect(),
            Err(e) => record_failure(&mut envelope, EntityKind::Artist, &e),
        }
        match albums {
            Ok(albums) => envelope.albums = albums.iter().map(AlbumSummary::from).collect(),
            Err(e) => record_failure(&mut envelope, EntityKind::Album, &e),
        }
        match playlists {
            Ok(playlists) => {
                envelope.playlists = playlists
                    .iter()
                    .map(|playlist| PlaylistSummary::new(playlist, None))
                    .collect()
            }
            Err(e) => record_failure(&mut envelope, EntityKind::Playlist, &e),
        }

        if envelope.failed.len() == 4 {
            return Err(AppError::Internal(
                "Search failed in every category".to_string(),
            ));
        }

        if !envelope.failed.is_empty() {
            tracing::warn!(
                failed = ?envelope.failed,
                "Partial search failure"
            );
        }

        tracing::info!(
            tracks = envelope.tracks.len(),
            artists = envelope.artists.len(),
            albums = envelope.albums.len(),
            playlists = envelope.playlists.len(),
            "Search complete"
        );

        Ok(envelope)
    }
}

fn record_failure(envelope: &mut SearchEnvelope, kind: EntityKind, error: &AppError) {
    tracing::warn!(error = %error, kind = %kind, "Search category failed");
    envelope.failed.push(kind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artist;
    use crate::store::testing::shared_store;
    use crate::store::MockCatalogStore;

    async fn federator() -> SearchFederator {
        SearchFederator::new(shared_store().await)
    }

    #[tokio::test]
    async fn test_artist_name_matches_their_tracks() {
        let envelope = federator().await.search("signals").await.unwrap();

        let track_ids: Vec<i64> = envelope.tracks.iter().map(|t| t.id).collect();
        assert_eq!(track_ids, vec![1, 2, 3]);
        assert_eq!(envelope.artists.len(), 1);
        assert_eq!(envelope.artists[0].name, "The Signals");
        assert!(envelope.albums.is_empty());
        assert!(envelope.failed.is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_independent() {
        // "e" hits something in every category
        let envelope = federator().await.search("E").await.unwrap();
        assert!(!envelope.tracks.is_empty());
        assert!(!envelope.artists.is_empty());
        assert!(!envelope.albums.is_empty());
        assert!(!envelope.playlists.is_empty());
    }

    #[tokio::test]
    async fn test_query_is_trimmed() {
        let envelope = federator().await.search("  morning  ").await.unwrap();
        assert_eq!(envelope.playlists.len(), 1);
        assert_eq!(envelope.playlists[0].id, 10);
    }

    #[tokio::test]
    async fn test_no_matches_is_four_empty_lists() {
        let envelope = federator().await.search("abc").await.unwrap();
        assert_eq!(envelope, SearchEnvelope::default());
    }

    #[tokio::test]
    async fn test_limit_caps_each_category() {
        let envelope = federator()
            .await
            .with_limit(1)
            .search("signals")
            .await
            .unwrap();
        assert_eq!(envelope.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_query_never_touches_store() {
        // No expectations: any store call would panic
        let store = MockCatalogStore::new();
        let federator = SearchFederator::new(Arc::new(store));

        let result = federator.search("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_one_failing_category_degrades() {
        let mut store = MockCatalogStore::new();
        store
            .expect_tracks()
            .returning(|_, _, _| Err(AppError::Internal("scan failed".to_string())));
        store.expect_artists_matching().returning(|_, _| {
            Ok(vec![Artist {
                id: 1,
                name: "The Signals".to_string(),
                image: String::new(),
            }])
        });
        store.expect_albums_matching().returning(|_, _| Ok(vec![]));
        store.expect_playlists_matching().returning(|_, _| Ok(vec![]));

        let envelope = SearchFederator::new(Arc::new(store))
            .search("signals")
            .await
            .unwrap();
        assert!(envelope.tracks.is_empty());
        assert_eq!(envelope.artists.len(), 1);
        assert_eq!(envelope.failed, vec![EntityKind::Track]);
    }

    #[tokio::test]
    async fn test_all_categories_failing_is_an_error() {
        let mut store = MockCatalogStore::new();
        store
            .expect_tracks()
            .returning(|_, _, _| Err(AppError::Internal("down".to_string())));
        store
            .expect_artists_matching()
            .returning(|_, _| Err(AppError::Internal("down".to_string())));
        store
            .expect_albums_matching()
            .returning(|_, _| Err(AppError::Internal("down".to_string())));
        store
            .expect_playlists_matching()
            .returning(|_, _| Err(AppError::Internal("down".to_string())));

        let result = SearchFederator::new(Arc::new(store)).search("x").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
