use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AlbumSummary, EntityRef, LibraryEnvelope, PodcastSummary, UserId},
    services::playlists::owned_summaries,
    store::CatalogStore,
};

/// A user's saved collection: owned playlists plus saved albums and podcasts
#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn CatalogStore>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Saved entries that no longer resolve are left out of the envelope.
    pub async fn library(&self, user: UserId) -> AppResult<LibraryEnvelope> {
        if self.store.user(user).await?.is_none() {
            return Err(AppError::not_found("User", user));
        }

        let mut library = LibraryEnvelope {
            playlists: owned_summaries(self.store.as_ref(), user, u32::MAX).await?,
            ..LibraryEnvelope::default()
        };

        for entry in self.store.library_entries(user).await? {
            match entry {
                EntityRef::Album(id) => match self.store.album(id).await? {
                    Some(album) => library.albums.push(AlbumSummary::from(&album)),
                    None => tracing::debug!(user_id = user, album_id = id, "Saved album is gone"),
                },
                EntityRef::Podcast(id) => match self.store.podcast(id).await? {
                    Some(podcast) => library.podcasts.push(PodcastSummary::from(&podcast)),
                    None => {
                        tracing::debug!(user_id = user, podcast_id = id, "Saved podcast is gone")
                    }
                },
                other => tracing::debug!(user_id = user, target = ?other, "Skipping library entry"),
            }
        }

        Ok(library)
    }
}
