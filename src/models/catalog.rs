use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TrackId = i64;
pub type ArtistId = i64;
pub type AlbumId = i64;
pub type PlaylistId = i64;
pub type PodcastId = i64;
pub type EpisodeId = i64;

/// A track as served by the store, joined with the artist and album fields
/// every response shape needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub album_id: AlbumId,
    pub album_title: String,
    pub album_cover: String,
    /// Whole seconds
    pub duration: u32,
    pub audio_url: String,
    /// Unordered, possibly empty
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub cover: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Playlist {
    pub id: PlaylistId,
    pub title: String,
    pub cover: String,
    pub owner_id: UserId,
    pub updated_at: DateTime<Utc>,
}

/// One row of the playlist/track join relation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Membership {
    pub playlist_id: PlaylistId,
    pub track_id: TrackId,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Podcast {
    pub id: PodcastId,
    pub title: String,
    pub cover: String,
    /// Ordered by position, decoded once by the store
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    pub duration: u32,
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub image: String,
}
