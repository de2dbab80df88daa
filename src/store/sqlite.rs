use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{CatalogStore, MembershipFilter, TrackFilter, TrackOrder};
use crate::{
    error::{AppError, AppResult},
    models::{
        ActivityEntry, Album, AlbumId, Artist, ArtistId, EntityKind, EntityRef, Episode,
        Membership, NewActivity, Playlist, PlaylistId, Podcast, PodcastId, Track, TrackId, User,
        UserId,
    },
};

const TRACK_SELECT: &str = r#"
    SELECT t.id, t.title, t.artist_id, a.name AS artist_name,
           t.album_id, al.title AS album_title, al.cover AS album_cover,
           t.duration, t.audio_url,
           (SELECT json_group_array(g.genre) FROM track_genres g WHERE g.track_id = t.id) AS genres
    FROM tracks t
    JOIN artists a ON a.id = t.artist_id
    JOIN albums al ON al.id = t.album_id
"#;

const ALBUM_SELECT: &str = r#"
    SELECT al.id, al.title, al.artist_id, a.name AS artist_name, al.cover
    FROM albums al
    JOIN artists a ON a.id = al.artist_id
"#;

#[derive(sqlx::FromRow)]
struct TrackRow {
    id: TrackId,
    title: String,
    artist_id: ArtistId,
    artist_name: String,
    album_id: AlbumId,
    album_title: String,
    album_cover: String,
    duration: u32,
    audio_url: String,
    genres: String,
}

impl TryFrom<TrackRow> for Track {
    type Error = AppError;

    fn try_from(row: TrackRow) -> AppResult<Self> {
        let genres: Vec<String> = serde_json::from_str(&row.genres).map_err(|e| {
            AppError::Internal(format!("Corrupt genre list for track {}: {}", row.id, e))
        })?;

        Ok(Track {
            id: row.id,
            title: row.title,
            artist_id: row.artist_id,
            artist_name: row.artist_name,
            album_id: row.album_id,
            album_title: row.album_title,
            album_cover: row.album_cover,
            duration: row.duration,
            audio_url: row.audio_url,
            genres,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: i64,
    user_id: UserId,
    kind: EntityKind,
    reference_id: i64,
    context: Option<String>,
    played_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        ActivityEntry {
            id: row.id,
            user_id: row.user_id,
            target: EntityRef::new(row.kind, row.reference_id),
            context: row.context,
            played_at: row.played_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PodcastRow {
    id: PodcastId,
    title: String,
    cover: String,
}

/// Entity store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

/// Turns a violated `(owner_id, title)` index into a client error
fn duplicate_title(err: sqlx::Error, title: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::InvalidInput(
            format!("a playlist titled \"{}\" already exists", title),
        ),
        other => AppError::Database(other),
    }
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn touch_playlist(&self, playlist: PlaylistId) -> AppResult<()> {
        sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(playlist)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Appends the WHERE/JOIN fragment for a track filter
fn push_track_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TrackFilter) {
    match filter {
        TrackFilter::All => {}
        TrackFilter::Ids(ids) => {
            qb.push(" WHERE t.id IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        TrackFilter::Artist(id) => {
            qb.push(" WHERE t.artist_id = ").push_bind(*id);
        }
        TrackFilter::Album(id) => {
            qb.push(" WHERE t.album_id = ").push_bind(*id);
        }
        TrackFilter::Playlist(id) => {
            qb.push(" JOIN playlist_tracks pt ON pt.track_id = t.id WHERE pt.playlist_id = ")
                .push_bind(*id);
        }
        TrackFilter::AnyGenre(genres) => {
            qb.push(
                " WHERE EXISTS (SELECT 1 FROM track_genres g WHERE g.track_id = t.id AND g.genre IN (",
            );
            let mut separated = qb.separated(", ");
            for genre in genres {
                separated.push_bind(genre.clone());
            }
            separated.push_unseparated("))");
        }
        TrackFilter::TitleOrArtist(needle) => {
            qb.push(" WHERE instr(lower(t.title), lower(")
                .push_bind(needle.clone())
                .push(")) > 0 OR instr(lower(a.name), lower(")
                .push_bind(needle.clone())
                .push(")) > 0");
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn track(&self, id: TrackId) -> AppResult<Option<Track>> {
        let mut tracks = self
            .tracks(TrackFilter::Ids(vec![id]), TrackOrder::Natural, Some(1))
            .await?;
        Ok(tracks.pop())
    }

    async fn artist(&self, id: ArtistId) -> AppResult<Option<Artist>> {
        let artist = sqlx::query_as::<_, Artist>("SELECT id, name, image FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(artist)
    }

    async fn album(&self, id: AlbumId) -> AppResult<Option<Album>> {
        let album = sqlx::query_as::<_, Album>(&format!("{} WHERE al.id = ?", ALBUM_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(album)
    }

    async fn playlist(&self, id: PlaylistId) -> AppResult<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "SELECT id, title, cover, owner_id, updated_at FROM playlists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(playlist)
    }

    async fn podcast(&self, id: PodcastId) -> AppResult<Option<Podcast>> {
        let Some(row) =
            sqlx::query_as::<_, PodcastRow>("SELECT id, title, cover FROM podcasts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT id, title, duration, audio_url
            FROM podcast_episodes
            WHERE podcast_id = ?
            ORDER BY position, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Podcast {
            id: row.id,
            title: row.title,
            cover: row.cover,
            episodes,
        }))
    }

    async fn user(&self, id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, image FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn tracks(
        &self,
        filter: TrackFilter,
        order: TrackOrder,
        limit: Option<u32>,
    ) -> AppResult<Vec<Track>> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(TRACK_SELECT);
        push_track_filter(&mut qb, &filter);

        match (order, &filter) {
            (TrackOrder::Random, _) => qb.push(" ORDER BY RANDOM()"),
            (TrackOrder::Natural, TrackFilter::Playlist(_)) => {
                qb.push(" ORDER BY pt.position, t.id")
            }
            (TrackOrder::Natural, _) => qb.push(" ORDER BY t.album_id, t.id"),
        };

        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = qb.build_query_as::<TrackRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Track::try_from).collect()
    }

    async fn artists_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Artist>> {
        let artists = sqlx::query_as::<_, Artist>(
            r#"
            SELECT id, name, image FROM artists
            WHERE instr(lower(name), lower(?)) > 0
            ORDER BY name, id
            LIMIT ?
            "#,
        )
        .bind(needle)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(artists)
    }

    async fn albums_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Album>> {
        let albums = sqlx::query_as::<_, Album>(&format!(
            "{} WHERE instr(lower(al.title), lower(?)) > 0 ORDER BY al.title, al.id LIMIT ?",
            ALBUM_SELECT
        ))
        .bind(needle)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(albums)
    }

    async fn playlists_matching(&self, needle: &str, limit: u32) -> AppResult<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, title, cover, owner_id, updated_at FROM playlists
            WHERE instr(lower(title), lower(?)) > 0
            ORDER BY title, id
            LIMIT ?
            "#,
        )
        .bind(needle)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(playlists)
    }

    async fn playlists_by_owner(&self, owner: UserId, limit: u32) -> AppResult<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, title, cover, owner_id, updated_at FROM playlists
            WHERE owner_id = ?
            ORDER BY updated_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(owner)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(playlists)
    }

    async fn memberships(&self, filter: MembershipFilter) -> AppResult<Vec<Membership>> {
        let query = match filter {
            MembershipFilter::Playlist(id) => sqlx::query_as::<_, Membership>(
                r#"
                SELECT playlist_id, track_id, position FROM playlist_tracks
                WHERE playlist_id = ?
                ORDER BY position, track_id
                "#,
            )
            .bind(id),
            MembershipFilter::Owner(owner) => sqlx::query_as::<_, Membership>(
                r#"
                SELECT pt.playlist_id, pt.track_id, pt.position
                FROM playlist_tracks pt
                JOIN playlists p ON p.id = pt.playlist_id
                WHERE p.owner_id = ?
                ORDER BY pt.playlist_id, pt.position
                "#,
            )
            .bind(owner),
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn recent_activity(
        &self,
        user: UserId,
        kind: Option<EntityKind>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, kind, reference_id, context, played_at
            FROM activity
            WHERE user_id = ? AND (? IS NULL OR kind = ?)
            ORDER BY played_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user)
        .bind(kind)
        .bind(kind)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    async fn append_activity(&self, entry: NewActivity) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity (user_id, kind, reference_id, context, played_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.target.kind())
        .bind(entry.target.id())
        .bind(entry.context)
        .bind(entry.played_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn top_genres(&self, user: UserId, top_n: u32) -> AppResult<Vec<String>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT g.genre, COUNT(*) AS cnt
            FROM library_tracks lt
            JOIN track_genres g ON g.track_id = lt.track_id
            WHERE lt.user_id = ?
            GROUP BY g.genre
            ORDER BY cnt DESC, g.genre ASC
            LIMIT ?
            "#,
        )
        .bind(user)
        .bind(i64::from(top_n))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(genre, _)| genre).collect())
    }

    async fn library_entries(&self, user: UserId) -> AppResult<Vec<EntityRef>> {
        let rows = sqlx::query_as::<_, (EntityKind, i64)>(
            r#"
            SELECT kind, reference_id FROM library_entries
            WHERE user_id = ?
            ORDER BY kind = 'podcast', reference_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(kind, id)| EntityRef::new(kind, id))
            .collect())
    }

    async fn create_playlist(
        &self,
        owner: UserId,
        title: &str,
        cover: &str,
    ) -> AppResult<Playlist> {
        let updated_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO playlists (title, cover, owner_id, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(cover)
        .bind(owner)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_title(e, title))?;

        Ok(Playlist {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            cover: cover.to_string(),
            owner_id: owner,
            updated_at,
        })
    }

    async fn update_playlist(
        &self,
        id: PlaylistId,
        title: Option<String>,
        cover: Option<String>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE playlists
            SET title = COALESCE(?, title), cover = COALESCE(?, cover), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(title.as_deref())
        .bind(cover)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_title(e, title.as_deref().unwrap_or_default()))?;
        Ok(())
    }

    async fn add_playlist_track(&self, playlist: PlaylistId, track: TrackId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO playlist_tracks (playlist_id, track_id, position)
            SELECT ?, ?, COALESCE(MAX(position), -1) + 1
            FROM playlist_tracks WHERE playlist_id = ?
            "#,
        )
        .bind(playlist)
        .bind(track)
        .bind(playlist)
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            self.touch_playlist(playlist).await?;
        }
        Ok(added)
    }

    async fn remove_playlist_track(
        &self,
        playlist: PlaylistId,
        track: TrackId,
    ) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
                .bind(playlist)
                .bind(track)
                .execute(&self.pool)
                .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.touch_playlist(playlist).await?;
        }
        Ok(removed)
    }

    async fn set_playlist_positions(
        &self,
        playlist: PlaylistId,
        positions: Vec<(TrackId, i64)>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for (track, position) in positions {
            let result = sqlx::query(
                "UPDATE playlist_tracks SET position = ? WHERE playlist_id = ? AND track_id = ?",
            )
            .bind(position)
            .bind(playlist)
            .bind(track)
            .execute(&mut *tx)
            .await?;

            // Dropping the transaction rolls back the rows already moved
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "track {} left playlist {} during reorder",
                    track, playlist
                )));
            }
        }

        sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(playlist)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
