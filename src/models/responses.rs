use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::EntityKind;
use super::catalog::{
    AlbumId, Artist, ArtistId, Episode, Playlist, PlaylistId, Podcast, PodcastId, Track, User,
};
use super::Album;

/// A playable record as the client renders it in any list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayableItem {
    pub id: i64,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<ArtistId>,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<AlbumId>,
    pub album_art: String,
    pub audio_url: String,
    /// In seconds
    pub duration: u32,
    pub downloaded: bool,
}

impl From<&Track> for PlayableItem {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist_name.clone(),
            artist_id: Some(track.artist_id),
            album: track.album_title.clone(),
            album_id: Some(track.album_id),
            album_art: track.album_cover.clone(),
            audio_url: track.audio_url.clone(),
            duration: track.duration,
            downloaded: false,
        }
    }
}

impl PlayableItem {
    /// Adapts a podcast episode into the track shape. Artist and album stay blank.
    pub fn from_episode(episode: &Episode, podcast: &Podcast) -> Self {
        Self {
            id: episode.id,
            title: episode.title.clone(),
            artist: String::new(),
            artist_id: None,
            album: String::new(),
            album_id: None,
            album_art: podcast.cover.clone(),
            audio_url: episode.audio_url.clone(),
            duration: episode.duration,
            downloaded: false,
        }
    }
}

/// Unified detail view shared by playlists, albums, artists and podcasts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailResponse {
    pub id: i64,
    pub title: String,
    pub cover: String,
    pub owner_name: String,
    pub owner_image: String,
    /// Formatted total, e.g. "1h03m" or "1h3m4s"
    pub duration: String,
    pub total_seconds: u64,
    pub track_count: usize,
    pub tracks: Vec<PlayableItem>,
}

/// One row of the recent-activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedEntry {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: i64,
    pub played_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistSummary {
    pub id: ArtistId,
    pub name: String,
    pub image: String,
}

impl From<&Artist> for ArtistSummary {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name.clone(),
            image: artist.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumSummary {
    pub album_id: AlbumId,
    pub title: String,
    pub artist: String,
    pub cover: String,
}

impl From<&Album> for AlbumSummary {
    fn from(album: &Album) -> Self {
        Self {
            album_id: album.id,
            title: album.title.clone(),
            artist: album.artist_name.clone(),
            cover: album.cover.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub cover: String,
    pub last_updated: DateTime<Utc>,
}

impl PlaylistSummary {
    pub fn new(playlist: &Playlist, subtitle: Option<String>) -> Self {
        Self {
            id: playlist.id,
            title: playlist.title.clone(),
            subtitle,
            cover: playlist.cover.clone(),
            last_updated: playlist.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PodcastSummary {
    pub id: PodcastId,
    pub title: String,
    pub cover: String,
}

impl From<&Podcast> for PodcastSummary {
    fn from(podcast: &Podcast) -> Self {
        Self {
            id: podcast.id,
            title: podcast.title.clone(),
            cover: podcast.cover.clone(),
        }
    }
}

/// Everything a user keeps in their library, grouped by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryEnvelope {
    pub playlists: Vec<PlaylistSummary>,
    pub albums: Vec<AlbumSummary>,
    pub podcasts: Vec<PodcastSummary>,
}

/// Federated search result, one list per entity kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchEnvelope {
    pub tracks: Vec<PlayableItem>,
    pub artists: Vec<ArtistSummary>,
    pub albums: Vec<AlbumSummary>,
    pub playlists: Vec<PlaylistSummary>,
    /// Categories whose scan failed and were returned empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<EntityKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub image: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
        }
    }
}
