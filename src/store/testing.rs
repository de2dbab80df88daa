//! Small catalog shared by the store and service tests.
//!
//! Users: 1 (owns playlists 10 and 11, has a library), 2 (nothing).
//! User 1 saved albums 20 and 22 and podcast 40.
//! Tracks 1-3 by "The Signals" on "First Light" with durations 125, 3600
//! and 59 seconds; tracks 4-5 by "Mira Vale" on "Low Tide".
//! Playlist 10 holds tracks 3, 1, 2 in that order; playlist 11 is empty.
//! Podcast 40 has episodes 402 then 401.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::{CatalogStore, SqliteCatalogStore};
use crate::db::create_memory_pool;

/// A fixed point in time offset by `secs`
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub async fn seed(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO users (id, name, image) VALUES (1, 'Ada', '/media/ada.jpg'), (2, 'Grace', '')",
        "INSERT INTO artists (id, name, image) VALUES (1, 'The Signals', '/media/signals.jpg'), (2, 'Mira Vale', '/media/mira.jpg')",
        "INSERT INTO albums (id, title, artist_id, cover) VALUES
            (20, 'First Light', 1, '/media/first-light.jpg'),
            (21, 'Low Tide', 2, '/media/low-tide.jpg'),
            (22, 'Empty Rooms', 2, '/media/empty-rooms.jpg')",
        "INSERT INTO tracks (id, title, artist_id, album_id, duration, audio_url) VALUES
            (1, 'Opening', 1, 20, 125, '/media/1.mp3'),
            (2, 'Static Bloom', 1, 20, 3600, '/media/2.mp3'),
            (3, 'Long Way Home', 1, 20, 59, '/media/3.mp3'),
            (4, 'Drift', 2, 21, 200, '/media/4.mp3'),
            (5, 'Undertow', 2, 21, 180, '/media/5.mp3')",
        "INSERT INTO track_genres (track_id, genre) VALUES
            (1, 'rock'), (1, 'indie'), (2, 'rock'), (3, 'indie'), (4, 'jazz')",
        "INSERT INTO library_tracks (user_id, track_id) VALUES (1, 1), (1, 2), (1, 4)",
        "INSERT INTO library_entries (user_id, kind, reference_id) VALUES
            (1, 'podcast', 40), (1, 'album', 22), (1, 'album', 20)",
        "INSERT INTO podcasts (id, title, cover) VALUES (40, 'Deep Signals', '/media/deep.jpg')",
        "INSERT INTO podcast_episodes (id, podcast_id, position, title, duration, audio_url) VALUES
            (401, 40, 1, 'Part Two', 1800, '/media/401.mp3'),
            (402, 40, 0, 'Part One', 1500, '/media/402.mp3')",
    ];
    for statement in statements {
        sqlx::query(statement).execute(pool).await.unwrap();
    }

    for (id, title, updated_at) in [(10, "Morning Mix", ts(1000)), (11, "Empty Evenings", ts(500))] {
        sqlx::query(
            "INSERT INTO playlists (id, title, cover, owner_id, updated_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(id)
        .bind(title)
        .bind(format!("/media/playlist-{}.jpg", id))
        .bind(updated_at)
        .execute(pool)
        .await
        .unwrap();
    }

    for (track, position) in [(3, 0), (1, 1), (2, 2)] {
        sqlx::query("INSERT INTO playlist_tracks (playlist_id, track_id, position) VALUES (10, ?, ?)")
            .bind(track)
            .bind(position)
            .execute(pool)
            .await
            .unwrap();
    }
}

pub async fn seeded_store() -> SqliteCatalogStore {
    let pool = create_memory_pool().await.unwrap();
    seed(&pool).await;
    SqliteCatalogStore::new(pool)
}

pub async fn shared_store() -> Arc<dyn CatalogStore> {
    Arc::new(seeded_store().await)
}

/// Catalog with users but no tracks at all
pub async fn empty_store() -> Arc<dyn CatalogStore> {
    let pool = create_memory_pool().await.unwrap();
    sqlx::query("INSERT INTO users (id, name, image) VALUES (1, 'Ada', '')")
        .execute(&pool)
        .await
        .unwrap();
    Arc::new(SqliteCatalogStore::new(pool))
}
