use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{EntityKind, EntityRef, Track, TrackId, UserId},
    store::{CatalogStore, MembershipFilter, TrackFilter, TrackOrder},
};

/// Maximum number of recommended tracks
pub const RECOMMENDATION_LIMIT: u32 = 20;

/// Recent track plays considered by the affinity tier
const RECENT_PLAY_WINDOW: u32 = 20;

/// Genres considered by the genre-weighted mode
const TOP_GENRE_COUNT: u32 = 3;

/// Which ordered chain of strategies produces the recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
    /// Recent plays, then the user's playlists, then the whole catalog
    #[default]
    Fallback,
    /// The user's top library genres, then the whole catalog
    Genre,
}

/// One strategy of a fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    RecentPlays,
    PlaylistPool,
    TopGenres,
    GlobalRandom,
}

const FALLBACK_CHAIN: &[Tier] = &[Tier::RecentPlays, Tier::PlaylistPool, Tier::GlobalRandom];
const GENRE_CHAIN: &[Tier] = &[Tier::TopGenres, Tier::GlobalRandom];

impl RecommendationMode {
    /// Tiers in priority order
    pub fn chain(&self) -> &'static [Tier] {
        match self {
            RecommendationMode::Fallback => FALLBACK_CHAIN,
            RecommendationMode::Genre => GENRE_CHAIN,
        }
    }
}

/// Source of the random candidate order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Randomness {
    /// Let the store shuffle (`ORDER BY RANDOM()`)
    Store,
    /// Fetch in natural order and shuffle locally with a fixed seed
    Seeded(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Tier that produced the tracks; `None` when the catalog is empty
    pub tier: Option<Tier>,
    pub tracks: Vec<Track>,
}

/// Picks up to [`RECOMMENDATION_LIMIT`] tracks for a user by walking a chain
/// of strategies until one of them yields candidates.
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn CatalogStore>,
    limit: u32,
    randomness: Randomness,
}

impl Recommender {
    pub fn new(store: Arc<dyn CatalogStore>, randomness: Randomness) -> Self {
        Self {
            store,
            limit: RECOMMENDATION_LIMIT,
            randomness,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub async fn recommend(
        &self,
        user: UserId,
        mode: RecommendationMode,
    ) -> AppResult<Recommendation> {
        for &tier in mode.chain() {
            let tracks = self.candidates(tier, user).await?;
            if !tracks.is_empty() {
                tracing::info!(
                    user_id = user,
                    tier = ?tier,
                    count = tracks.len(),
                    "Recommendations selected"
                );
                return Ok(Recommendation {
                    tier: Some(tier),
                    tracks,
                });
            }
            tracing::debug!(user_id = user, tier = ?tier, "Tier yielded no candidates");
        }

        tracing::info!(user_id = user, "Catalog is empty, no recommendations");
        Ok(Recommendation {
            tier: None,
            tracks: Vec::new(),
        })
    }

    async fn candidates(&self, tier: Tier, user: UserId) -> AppResult<Vec<Track>> {
        match tier {
            Tier::RecentPlays => {
                let entries = self
                    .store
                    .recent_activity(user, Some(EntityKind::Track), RECENT_PLAY_WINDOW)
                    .await?;
                let ids = unique_ids(entries.iter().filter_map(|entry| match entry.target {
                    EntityRef::Track(id) => Some(id),
                    _ => None,
                }));
                self.draw(TrackFilter::Ids(ids)).await
            }
            Tier::PlaylistPool => {
                let memberships = self
                    .store
                    .memberships(MembershipFilter::Owner(user))
                    .await?;
                let ids = unique_ids(memberships.iter().map(|m| m.track_id));
                self.draw(TrackFilter::Ids(ids)).await
            }
            Tier::TopGenres => {
                let genres = self.store.top_genres(user, TOP_GENRE_COUNT).await?;
                tracing::debug!(user_id = user, genres = ?genres, "Top library genres");
                self.draw(TrackFilter::AnyGenre(genres)).await
            }
            Tier::GlobalRandom => self.draw(TrackFilter::All).await,
        }
    }

    /// Fetches the candidates matching `filter` in random order, capped at the limit
    async fn draw(&self, filter: TrackFilter) -> AppResult<Vec<Track>> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        match self.randomness {
            Randomness::Store => {
                self.store
                    .tracks(filter, TrackOrder::Random, Some(self.limit))
                    .await
            }
            Randomness::Seeded(seed) => {
                let mut tracks = self.store.tracks(filter, TrackOrder::Natural, None).await?;
                let mut rng = StdRng::seed_from_u64(seed);
                tracks.shuffle(&mut rng);
                tracks.truncate(self.limit as usize);
                Ok(tracks)
            }
        }
    }
}

/// Deduplicates while keeping first-seen order
fn unique_ids(ids: impl Iterator<Item = TrackId>) -> Vec<TrackId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
