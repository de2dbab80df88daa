use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::catalog::{AlbumId, ArtistId, PlaylistId, PodcastId, TrackId, UserId};

/// The five displayable entity kinds an activity entry can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntityKind {
    Track,
    Artist,
    Album,
    Playlist,
    Podcast,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Playlist => "playlist",
            EntityKind::Podcast => "podcast",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(EntityKind::Track),
            "artist" => Ok(EntityKind::Artist),
            "album" => Ok(EntityKind::Album),
            "playlist" => Ok(EntityKind::Playlist),
            "podcast" => Ok(EntityKind::Podcast),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Typed reference to one catalog entity.
///
/// Doubles as the feed dedup key: two entries collapse exactly when their
/// kind and id are both equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Track(TrackId),
    Artist(ArtistId),
    Album(AlbumId),
    Playlist(PlaylistId),
    Podcast(PodcastId),
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        match kind {
            EntityKind::Track => EntityRef::Track(id),
            EntityKind::Artist => EntityRef::Artist(id),
            EntityKind::Album => EntityRef::Album(id),
            EntityKind::Playlist => EntityRef::Playlist(id),
            EntityKind::Podcast => EntityRef::Podcast(id),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Track(_) => EntityKind::Track,
            EntityRef::Artist(_) => EntityKind::Artist,
            EntityRef::Album(_) => EntityKind::Album,
            EntityRef::Playlist(_) => EntityKind::Playlist,
            EntityRef::Podcast(_) => EntityKind::Podcast,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            EntityRef::Track(id)
            | EntityRef::Artist(id)
            | EntityRef::Album(id)
            | EntityRef::Playlist(id)
            | EntityRef::Podcast(id) => id,
        }
    }
}

/// One logged play event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: UserId,
    pub target: EntityRef,
    /// What surfaced the play (e.g. a search, a recommendation)
    pub context: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// A play event that has not been written yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub target: EntityRef,
    pub context: Option<String>,
    pub played_at: DateTime<Utc>,
}

impl NewActivity {
    /// Stamps the play with the current time
    pub fn now(user_id: UserId, target: EntityRef, context: Option<String>) -> Self {
        Self {
            user_id,
            target,
            context,
            played_at: Utc::now(),
        }
    }
}
