use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Membership, Playlist, PlaylistId, PlaylistSummary, TrackId, UserId},
    store::{CatalogStore, MembershipFilter},
};

/// Playlists shown in the "recent playlists" row
pub const RECENT_PLAYLISTS_LIMIT: u32 = 10;

fn track_count_subtitle(count: usize) -> String {
    format!("Playlist • {} tracks", count)
}

/// Computes new positions for a reorder request.
///
/// The positions currently held by the mentioned tracks are handed out again
/// in the requested order. Unmentioned tracks keep theirs, so positions stay
/// unique. Returns only the rows whose position changes.
pub fn reassign_positions(
    current: &[Membership],
    requested: &[TrackId],
) -> AppResult<Vec<(TrackId, i64)>> {
    let held: HashMap<TrackId, i64> = current
        .iter()
        .map(|membership| (membership.track_id, membership.position))
        .collect();

    let mut seen = HashSet::with_capacity(requested.len());
    for track in requested {
        if !seen.insert(*track) {
            return Err(AppError::InvalidInput(format!(
                "Track {} appears more than once",
                track
            )));
        }
        if !held.contains_key(track) {
            return Err(AppError::InvalidInput(format!(
                "Track {} is not in the playlist",
                track
            )));
        }
    }

    let mut slots: Vec<i64> = requested.iter().map(|track| held[track]).collect();
    slots.sort_unstable();

    Ok(requested
        .iter()
        .zip(slots)
        .filter(|(track, slot)| held[*track] != *slot)
        .map(|(track, slot)| (*track, slot))
        .collect())
}

/// Owned playlists, most recently modified first, subtitled with track counts
pub(crate) async fn owned_summaries(
    store: &dyn CatalogStore,
    owner: UserId,
    limit: u32,
) -> AppResult<Vec<PlaylistSummary>> {
    let playlists = store.playlists_by_owner(owner, limit).await?;
    let memberships = store.memberships(MembershipFilter::Owner(owner)).await?;

    let mut counts: HashMap<PlaylistId, usize> = HashMap::new();
    for membership in &memberships {
        *counts.entry(membership.playlist_id).or_default() += 1;
    }

    Ok(playlists
        .iter()
        .map(|playlist| {
            let count = counts.get(&playlist.id).copied().unwrap_or(0);
            PlaylistSummary::new(playlist, Some(track_count_subtitle(count)))
        })
        .collect())
}

/// Ownership and membership management for playlists
#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn CatalogStore>,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    async fn require(&self, id: PlaylistId) -> AppResult<Playlist> {
        self.store
            .playlist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist", id))
    }

    /// The user's most recently modified playlists with their track counts
    pub async fn recent(&self, owner: UserId) -> AppResult<Vec<PlaylistSummary>> {
        owned_summaries(self.store.as_ref(), owner, RECENT_PLAYLISTS_LIMIT).await
    }

    pub async fn create(
        &self,
        owner: UserId,
        title: &str,
        cover: Option<&str>,
    ) -> AppResult<PlaylistSummary> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput(
                "Playlist title must not be empty".to_string(),
            ));
        }

        if self.store.user(owner).await?.is_none() {
            return Err(AppError::not_found("User", owner));
        }

        let existing = self.store.playlists_by_owner(owner, u32::MAX).await?;
        if existing.iter().any(|playlist| playlist.title == title) {
            return Err(AppError::InvalidInput(format!(
                "You already have a playlist named {:?}",
                title
            )));
        }

        let playlist = self
            .store
            .create_playlist(owner, title, cover.unwrap_or_default())
            .await?;

        tracing::info!(playlist_id = playlist.id, owner_id = owner, "Playlist created");

        Ok(PlaylistSummary::new(&playlist, Some(track_count_subtitle(0))))
    }

    pub async fn update(
        &self,
        id: PlaylistId,
        title: Option<String>,
        cover: Option<String>,
    ) -> AppResult<()> {
        let title = title.map(|t| t.trim().to_string());
        if title.as_deref() == Some("") {
            return Err(AppError::InvalidInput(
                "Playlist title must not be empty".to_string(),
            ));
        }

        self.require(id).await?;
        self.store.update_playlist(id, title, cover).await
    }

    /// Appends the track at the end. Re-adding a member changes nothing.
    pub async fn add_track(&self, id: PlaylistId, track: TrackId) -> AppResult<()> {
        self.require(id).await?;
        if self.store.track(track).await?.is_none() {
            return Err(AppError::not_found("Track", track));
        }

        let added = self.store.add_playlist_track(id, track).await?;
        tracing::debug!(playlist_id = id, track_id = track, added, "Add track to playlist");
        Ok(())
    }

    pub async fn remove_track(&self, id: PlaylistId, track: TrackId) -> AppResult<()> {
        self.require(id).await?;
        let removed = self.store.remove_playlist_track(id, track).await?;
        tracing::debug!(playlist_id = id, track_id = track, removed, "Remove track from playlist");
        Ok(())
    }

    pub async fn reorder(&self, id: PlaylistId, track_ids: &[TrackId]) -> AppResult<()> {
        self.require(id).await?;
        let current = self
            .store
            .memberships(MembershipFilter::Playlist(id))
            .await?;

        let changes = reassign_positions(&current, track_ids)?;
        tracing::debug!(playlist_id = id, moved = changes.len(), "Reordering playlist");

        self.store.set_playlist_positions(id, changes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::shared_store;
    use crate::store::{MockCatalogStore, TrackFilter, TrackOrder};
    use chrono::Utc;

    fn membership(track_id: TrackId, position: i64) -> Membership {
        Membership {
            playlist_id: 1,
            track_id,
            position,
        }
    }

    async fn playlist_order(store: &Arc<dyn CatalogStore>, id: PlaylistId) -> Vec<TrackId> {
        store
            .tracks(TrackFilter::Playlist(id), TrackOrder::Natural, None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn test_full_reorder_redeals_every_slot() {
        let current = [membership(1, 0), membership(2, 1), membership(3, 2)];
        let changes = reassign_positions(&current, &[3, 1, 2]).unwrap();
        assert_eq!(changes, vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_partial_reorder_keeps_unmentioned_positions() {
        let current = [
            membership(1, 0),
            membership(2, 1),
            membership(3, 2),
            membership(4, 3),
        ];
        // Tracks 2 and 4 swap the slots 1 and 3; 1 and 3 stay put
        let changes = reassign_positions(&current, &[4, 2]).unwrap();
        assert_eq!(changes, vec![(4, 1), (2, 3)]);
    }

    #[test]
    fn test_reorder_rejects_duplicates_and_strangers() {
        let current = [membership(1, 0), membership(2, 1)];
        assert!(matches!(
            reassign_positions(&current, &[1, 1]),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            reassign_positions(&current, &[1, 9]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_same_order_changes_nothing() {
        let current = [membership(1, 0), membership(2, 5)];
        assert!(reassign_positions(&current, &[1, 2]).unwrap().is_empty());
        assert!(reassign_positions(&current, &[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_playlists_carry_track_counts() {
        let service = PlaylistService::new(shared_store().await);
        let recent = service.recent(1).await.unwrap();

        let ids: Vec<PlaylistId> = recent.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(recent[0].subtitle.as_deref(), Some("Playlist • 3 tracks"));
        assert_eq!(recent[1].subtitle.as_deref(), Some("Playlist • 0 tracks"));

        assert!(service.recent(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_duplicate_titles() {
        let service = PlaylistService::new(shared_store().await);

        assert!(matches!(
            service.create(1, "   ", None).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            service.create(1, "Morning Mix", None).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            service.create(99, "Anything", None).await,
            Err(AppError::NotFound(_))
        ));

        // Same title under another owner is fine
        let created = service.create(2, "Morning Mix", Some("/media/c.jpg")).await.unwrap();
        assert_eq!(created.title, "Morning Mix");
        assert_eq!(created.cover, "/media/c.jpg");
        assert_eq!(created.subtitle.as_deref(), Some("Playlist • 0 tracks"));
    }

    #[tokio::test]
    async fn test_created_playlist_is_most_recent() {
        let service = PlaylistService::new(shared_store().await);
        let created = service.create(1, "Late Night", None).await.unwrap();

        let recent = service.recent(1).await.unwrap();
        assert_eq!(recent[0].id, created.id);
    }

    #[tokio::test]
    async fn test_add_and_remove_tracks() {
        let store = shared_store().await;
        let service = PlaylistService::new(store.clone());

        service.add_track(11, 4).await.unwrap();
        service.add_track(11, 2).await.unwrap();
        service.add_track(11, 4).await.unwrap();
        assert_eq!(playlist_order(&store, 11).await, vec![4, 2]);

        service.remove_track(11, 4).await.unwrap();
        assert_eq!(playlist_order(&store, 11).await, vec![2]);

        assert!(matches!(
            service.add_track(11, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.add_track(999, 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_membership_change_bumps_last_modified() {
        let store = shared_store().await;
        let service = PlaylistService::new(store.clone());
        let before = store.playlist(11).await.unwrap().unwrap().updated_at;

        service.add_track(11, 1).await.unwrap();

        let after = store.playlist(11).await.unwrap().unwrap().updated_at;
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_reorder_persists_new_order() {
        let store = shared_store().await;
        let service = PlaylistService::new(store.clone());

        service.reorder(10, &[1, 2, 3]).await.unwrap();
        assert_eq!(playlist_order(&store, 10).await, vec![1, 2, 3]);

        assert!(matches!(
            service.reorder(10, &[1, 4]).await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(playlist_order(&store, 10).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let store = shared_store().await;
        let service = PlaylistService::new(store.clone());

        service
            .update(10, Some("Sunrise".to_string()), None)
            .await
            .unwrap();
        let playlist = store.playlist(10).await.unwrap().unwrap();
        assert_eq!(playlist.title, "Sunrise");
        assert_eq!(playlist.cover, "/media/playlist-10.jpg");

        assert!(matches!(
            service.update(10, Some(" ".to_string()), None).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            service.update(999, None, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_title_is_rejected() {
        let service = PlaylistService::new(shared_store().await);

        assert!(matches!(
            service
                .update(11, Some("Morning Mix".to_string()), None)
                .await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_reorder_surfaces_concurrent_removal_as_conflict() {
        let mut store = MockCatalogStore::new();
        store.expect_playlist().returning(|id| {
            Ok(Some(Playlist {
                id,
                title: "Morning Mix".to_string(),
                cover: String::new(),
                owner_id: 1,
                updated_at: Utc::now(),
            }))
        });
        store
            .expect_memberships()
            .returning(|_| Ok(vec![membership(3, 0), membership(1, 1)]));
        store
            .expect_set_playlist_positions()
            .times(1)
            .returning(|playlist, _| {
                Err(AppError::Conflict(format!(
                    "track 3 left playlist {} during reorder",
                    playlist
                )))
            });

        let service = PlaylistService::new(Arc::new(store));
        assert!(matches!(
            service.reorder(1, &[1, 3]).await,
            Err(AppError::Conflict(_))
        ));
    }
}
