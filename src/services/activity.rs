use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    error::AppResult,
    models::{
        ActivityEntry, EntityKind, EntityRef, FeedEntry, NewActivity, PlayableItem, UserId,
    },
    store::CatalogStore,
};

/// Size of the "recently played tracks" widget
pub const RECENT_TRACKS_LIMIT: usize = 4;

/// Track plays fetched to fill the widget after deduplication
const RECENT_TRACKS_OVERSAMPLE: u32 = 8;

/// Yields each (kind, id) target once, keeping the first (newest) occurrence.
///
/// Entries must already be ordered newest first.
pub fn dedup_by_target<'a, I>(entries: I) -> impl Iterator<Item = &'a ActivityEntry>
where
    I: IntoIterator<Item = &'a ActivityEntry>,
{
    let mut seen: HashSet<EntityRef> = HashSet::new();
    entries
        .into_iter()
        .filter(move |entry| seen.insert(entry.target))
}

/// Deduplicated, capped view of a newest-first activity log
pub fn dedup_recent(entries: &[ActivityEntry], cap: usize) -> Vec<&ActivityEntry> {
    dedup_by_target(entries).take(cap).collect()
}

/// Write and read side of the play log
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn CatalogStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Records a play in the background.
    ///
    /// Plays by unknown users or of entities that do not exist are skipped,
    /// so they never take up room in the feed's read window. Failures are
    /// logged and swallowed; the caller never waits on the write. The handle
    /// is only useful to tests that need the write to land.
    pub fn record(&self, entry: NewActivity) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let user_id = entry.user_id;
            let target = entry.target;
            match append_resolvable(store.as_ref(), entry).await {
                Ok(true) => tracing::debug!(user_id, target = ?target, "Play recorded"),
                Ok(false) => tracing::debug!(
                    user_id,
                    target = ?target,
                    "Skipping play for a missing user or entity"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    user_id,
                    target = ?target,
                    "Failed to record play"
                ),
            }
        })
    }

    /// Most-recent-first feed with one entry per (kind, id).
    ///
    /// `oversample` log entries are read so that enough distinct targets are
    /// left once repeats and dangling references are dropped.
    pub async fn feed(
        &self,
        user: UserId,
        size: usize,
        oversample: u32,
    ) -> AppResult<Vec<FeedEntry>> {
        let entries = self.store.recent_activity(user, None, oversample).await?;

        let mut feed = Vec::with_capacity(size);
        for entry in dedup_by_target(&entries) {
            if feed.len() >= size {
                break;
            }
            match self.resolve(entry).await {
                Ok(Some(item)) => feed.push(item),
                Ok(None) => tracing::debug!(
                    user_id = user,
                    target = ?entry.target,
                    "Dropping activity for a missing entity"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    user_id = user,
                    target = ?entry.target,
                    "Dropping activity that failed to resolve"
                ),
            }
        }

        tracing::debug!(
            user_id = user,
            fetched = entries.len(),
            returned = feed.len(),
            "Recent activity feed built"
        );

        Ok(feed)
    }

    /// Track-only variant of the feed, shaped as playable records
    pub async fn recent_tracks(&self, user: UserId) -> AppResult<Vec<PlayableItem>> {
        let entries = self
            .store
            .recent_activity(user, Some(EntityKind::Track), RECENT_TRACKS_OVERSAMPLE)
            .await?;

        let mut tracks = Vec::with_capacity(RECENT_TRACKS_LIMIT);
        for entry in dedup_by_target(&entries) {
            if tracks.len() >= RECENT_TRACKS_LIMIT {
                break;
            }
            let EntityRef::Track(id) = entry.target else {
                continue;
            };
            match self.store.track(id).await {
                Ok(Some(track)) => tracks.push(PlayableItem::from(&track)),
                Ok(None) => tracing::debug!(user_id = user, track_id = id, "Played track is gone"),
                Err(e) => tracing::warn!(error = %e, track_id = id, "Failed to resolve played track"),
            }
        }

        Ok(tracks)
    }

    async fn resolve(&self, entry: &ActivityEntry) -> AppResult<Option<FeedEntry>> {
        let mut item = FeedEntry {
            kind: entry.target.kind(),
            id: entry.target.id(),
            played_at: entry.played_at,
            title: None,
            subtitle: None,
            cover: None,
        };

        match entry.target {
            EntityRef::Track(id) => {
                let Some(track) = self.store.track(id).await? else {
                    return Ok(None);
                };
                item.title = Some(track.title);
                item.subtitle = Some(track.artist_name);
                item.cover = Some(track.album_cover);
            }
            EntityRef::Artist(id) => {
                let Some(artist) = self.store.artist(id).await? else {
                    return Ok(None);
                };
                item.title = Some(artist.name);
            }
            EntityRef::Album(id) => {
                let Some(album) = self.store.album(id).await? else {
                    return Ok(None);
                };
                item.title = Some(album.title);
                item.cover = Some(album.cover);
            }
            EntityRef::Playlist(id) => {
                let Some(playlist) = self.store.playlist(id).await? else {
                    return Ok(None);
                };
                item.title = Some(playlist.title);
                item.cover = Some(playlist.cover);
                item.subtitle = Some(format!(
                    "Updated {}",
                    playlist.updated_at.format("%Y-%m-%d")
                ));
            }
            EntityRef::Podcast(id) => {
                let Some(podcast) = self.store.podcast(id).await? else {
                    return Ok(None);
                };
                item.title = Some(podcast.title);
                item.cover = Some(podcast.cover);
            }
        }

        Ok(Some(item))
    }
}

/// Appends the entry when both the user and the target exist
async fn append_resolvable(store: &dyn CatalogStore, entry: NewActivity) -> AppResult<bool> {
    if store.user(entry.user_id).await?.is_none() {
        return Ok(false);
    }
    if !target_exists(store, entry.target).await? {
        return Ok(false);
    }
    store.append_activity(entry).await?;
    Ok(true)
}

async fn target_exists(store: &dyn CatalogStore, target: EntityRef) -> AppResult<bool> {
    let found = match target {
        EntityRef::Track(id) => store.track(id).await?.is_some(),
        EntityRef::Artist(id) => store.artist(id).await?.is_some(),
        EntityRef::Album(id) => store.album(id).await?.is_some(),
        EntityRef::Playlist(id) => store.playlist(id).await?.is_some(),
        EntityRef::Podcast(id) => store.podcast(id).await?.is_some(),
    };
    Ok(found)
}
