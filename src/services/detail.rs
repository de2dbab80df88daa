use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AlbumId, ArtistId, DetailResponse, PlayableItem, PlaylistId, PodcastId, Track},
    services::duration::{aggregate, DurationFormat},
    store::{CatalogStore, TrackFilter, TrackOrder},
};

/// Builds the unified detail view for every container kind
#[derive(Clone)]
pub struct DetailAssembler {
    store: Arc<dyn CatalogStore>,
}

struct Owner {
    name: String,
    image: String,
}

impl DetailAssembler {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Playlist with its tracks in position order. Duration is compact.
    pub async fn playlist(&self, id: PlaylistId) -> AppResult<DetailResponse> {
        let playlist = self
            .store
            .playlist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist", id))?;

        // A deleted owner leaves the header blank rather than failing the view
        let owner = match self.store.user(playlist.owner_id).await? {
            Some(user) => Owner {
                name: user.name,
                image: user.image,
            },
            None => Owner {
                name: String::new(),
                image: String::new(),
            },
        };

        let tracks = self
            .store
            .tracks(TrackFilter::Playlist(id), TrackOrder::Natural, None)
            .await?;

        Ok(assemble(
            id,
            playlist.title,
            playlist.cover,
            owner,
            &tracks,
            DurationFormat::Compact,
        ))
    }

    pub async fn album(&self, id: AlbumId) -> AppResult<DetailResponse> {
        let album = self
            .store
            .album(id)
            .await?
            .ok_or_else(|| AppError::not_found("Album", id))?;

        let image = self
            .store
            .artist(album.artist_id)
            .await?
            .map(|artist| artist.image)
            .unwrap_or_default();

        let tracks = self
            .store
            .tracks(TrackFilter::Album(id), TrackOrder::Natural, None)
            .await?;

        Ok(assemble(
            id,
            album.title,
            album.cover,
            Owner {
                name: album.artist_name,
                image,
            },
            &tracks,
            DurationFormat::Verbose,
        ))
    }

    /// Artist page: every track by the artist, the artist as its own owner
    pub async fn artist(&self, id: ArtistId) -> AppResult<DetailResponse> {
        let artist = self
            .store
            .artist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Artist", id))?;

        let tracks = self
            .store
            .tracks(TrackFilter::Artist(id), TrackOrder::Natural, None)
            .await?;

        Ok(assemble(
            id,
            artist.name.clone(),
            artist.image.clone(),
            Owner {
                name: artist.name,
                image: artist.image,
            },
            &tracks,
            DurationFormat::Verbose,
        ))
    }

    /// Podcast with its episodes adapted to the track shape
    pub async fn podcast(&self, id: PodcastId) -> AppResult<DetailResponse> {
        let podcast = self
            .store
            .podcast(id)
            .await?
            .ok_or_else(|| AppError::not_found("Podcast", id))?;

        let total = aggregate(&podcast.episodes, DurationFormat::Verbose);
        let tracks: Vec<PlayableItem> = podcast
            .episodes
            .iter()
            .map(|episode| PlayableItem::from_episode(episode, &podcast))
            .collect();

        Ok(DetailResponse {
            id,
            title: podcast.title,
            cover: podcast.cover,
            owner_name: String::new(),
            owner_image: String::new(),
            duration: total.formatted,
            total_seconds: total.seconds,
            track_count: tracks.len(),
            tracks,
        })
    }
}

fn assemble(
    id: i64,
    title: String,
    cover: String,
    owner: Owner,
    tracks: &[Track],
    format: DurationFormat,
) -> DetailResponse {
    let total = aggregate(tracks, format);

    DetailResponse {
        id,
        title,
        cover,
        owner_name: owner.name,
        owner_image: owner.image,
        duration: total.formatted,
        total_seconds: total.seconds,
        track_count: tracks.len(),
        tracks: tracks.iter().map(PlayableItem::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::shared_store;
    use crate::store::MockCatalogStore;

    async fn assembler() -> DetailAssembler {
        DetailAssembler::new(shared_store().await)
    }

    #[tokio::test]
    async fn test_playlist_detail_sums_in_position_order() {
        let detail = assembler().await.playlist(10).await.unwrap();

        assert_eq!(detail.title, "Morning Mix");
        assert_eq!(detail.owner_name, "Ada");
        assert_eq!(detail.owner_image, "/media/ada.jpg");
        assert_eq!(detail.total_seconds, 3784);
        assert_eq!(detail.duration, "1h03m");
        assert_eq!(detail.track_count, 3);
        let ids: Vec<i64> = detail.tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_playlist_is_zero_minutes() {
        let detail = assembler().await.playlist(11).await.unwrap();
        assert!(detail.tracks.is_empty());
        assert_eq!(detail.track_count, 0);
        assert_eq!(detail.duration, "0m");
    }

    #[tokio::test]
    async fn test_album_detail_uses_artist_as_owner() {
        let detail = assembler().await.album(20).await.unwrap();

        assert_eq!(detail.owner_name, "The Signals");
        assert_eq!(detail.owner_image, "/media/signals.jpg");
        assert_eq!(detail.duration, "1h3m4s");
        assert_eq!(detail.track_count, 3);
    }

    #[tokio::test]
    async fn test_album_without_tracks_is_zero_seconds() {
        let detail = assembler().await.album(22).await.unwrap();
        assert!(detail.tracks.is_empty());
        assert_eq!(detail.duration, "0s");
    }

    #[tokio::test]
    async fn test_artist_detail_lists_their_tracks() {
        let detail = assembler().await.artist(2).await.unwrap();

        assert_eq!(detail.title, "Mira Vale");
        assert_eq!(detail.owner_name, "Mira Vale");
        assert_eq!(detail.owner_image, "/media/mira.jpg");
        assert_eq!(detail.total_seconds, 380);
        assert_eq!(detail.duration, "6m20s");
    }

    #[tokio::test]
    async fn test_podcast_episodes_adapt_to_track_shape() {
        let detail = assembler().await.podcast(40).await.unwrap();

        assert_eq!(detail.owner_name, "");
        assert_eq!(detail.total_seconds, 3300);
        assert_eq!(detail.duration, "55m0s");
        assert_eq!(detail.tracks[0].title, "Part One");
        assert_eq!(detail.tracks[0].artist, "");
        assert_eq!(detail.tracks[0].album_art, "/media/deep.jpg");
        assert_eq!(detail.tracks[0].album_id, None);
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let assembler = assembler().await;
        assert!(matches!(
            assembler.playlist(999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(assembler.album(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(assembler.artist(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            assembler.podcast(999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_parent_skips_child_scan() {
        let mut store = MockCatalogStore::new();
        store.expect_playlist().returning(|_| Ok(None));
        store.expect_tracks().never();

        let result = DetailAssembler::new(Arc::new(store)).playlist(5).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
