//! Entity store abstraction
//!
//! The aggregation services only ever talk to the catalog through this trait:
//! point lookups, filtered track scans, the playlist/track join relation and
//! the append-only activity log. The production implementation sits on
//! SQLite; tests swap in mocks to inject failures.

use crate::{
    error::AppResult,
    models::{
        ActivityEntry, Album, AlbumId, Artist, ArtistId, EntityKind, EntityRef, Membership,
        NewActivity,
        Playlist, PlaylistId, Podcast, PodcastId, Track, TrackId, User, UserId,
    },
};

pub mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

pub use sqlite::SqliteCatalogStore;

/// Which tracks a scan returns
#[derive(Debug, Clone, PartialEq)]
pub enum TrackFilter {
    /// The whole catalog
    All,
    Ids(Vec<TrackId>),
    Artist(ArtistId),
    Album(AlbumId),
    /// Members of a playlist, in playlist position order
    Playlist(PlaylistId),
    /// Tracks carrying at least one of the genres
    AnyGenre(Vec<String>),
    /// Case-insensitive substring on the track title or the artist name
    TitleOrArtist(String),
}

impl TrackFilter {
    /// True when the filter can match no track, whatever the catalog holds
    pub fn matches_nothing(&self) -> bool {
        match self {
            TrackFilter::Ids(ids) => ids.is_empty(),
            TrackFilter::AnyGenre(genres) => genres.is_empty(),
            _ => false,
        }
    }
}

/// Ordering of a track scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrder {
    /// Stable order: playlist position for playlist scans, album then id otherwise
    Natural,
    /// Store-side random order
    Random,
}

/// Rows of the playlist/track join relation to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipFilter {
    Playlist(PlaylistId),
    /// Every playlist owned by the user
    Owner(UserId),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn track(&self, id: TrackId) -> AppResult<Option<Track>>;

    async fn artist(&self, id: ArtistId) -> AppResult<Option<Artist>>;

    async fn album(&self, id: AlbumId) -> AppResult<Option<Album>>;

    async fn playlist(&self, id: PlaylistId) -> AppResult<Option<Playlist>>;

    /// Resolves the podcast together with its ordered episodes
    async fn podcast(&self, id: PodcastId) -> AppResult<Option<Podcast>>;

    async fn user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn tracks(
        &self,
        filter: TrackFilter,
        order: TrackOrder,
        limit: Option<u32>,
    ) -> AppResult<Vec<Track>>;

    /// Case-insensitive substring match on the artist name
    async fn artists_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Artist>>;

    /// Case-insensitive substring match on the album title
    async fn albums_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Album>>;

    /// Case-insensitive substring match on the playlist title
    async fn playlists_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Playlist>>;

    /// Playlists owned by the user, most recently modified first
    async fn playlists_by_owner(&self, owner: UserId, limit: u32) -> AppResult<Vec<Playlist>>;

    async fn memberships(&self, filter: MembershipFilter) -> AppResult<Vec<Membership>>;

    /// Most recent log entries for the user, newest first
    async fn recent_activity(
        &self,
        user: UserId,
        kind: Option<EntityKind>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>>;

    async fn append_activity(&self, entry: NewActivity) -> AppResult<()>;

    /// Most frequent genres across the tracks saved in the user's library
    async fn top_genres(&self, user: UserId, top_n: u32) -> AppResult<Vec<String>>;

    /// Albums and podcasts the user saved, albums first, each kind by id
    async fn library_entries(&self, user: UserId) -> AppResult<Vec<EntityRef>>;

    async fn create_playlist(&self, owner: UserId, title: &str, cover: &str)
        -> AppResult<Playlist>;

    async fn update_playlist(
        &self,
        id: PlaylistId,
        title: Option<String>,
        cover: Option<String>,
    ) -> AppResult<()>;

    /// Appends the track after the current last position. Returns false when
    /// the track was already a member.
    async fn add_playlist_track(&self, playlist: PlaylistId, track: TrackId) -> AppResult<bool>;

    /// Returns false when the track was not a member
    async fn remove_playlist_track(&self, playlist: PlaylistId, track: TrackId)
        -> AppResult<bool>;

    /// Writes the given positions atomically and bumps the playlist's
    /// last-modified timestamp
    async fn set_playlist_positions(
        &self,
        playlist: PlaylistId,
        positions: Vec<(TrackId, i64)>,
    ) -> AppResult<()>;
}
