mod activity;
mod catalog;
mod responses;

pub use activity::{ActivityEntry, EntityKind, EntityRef, NewActivity};
pub use catalog::{
    Album, AlbumId, Artist, ArtistId, Episode, EpisodeId, Membership, Playlist, PlaylistId,
    Podcast, PodcastId, Track, TrackId, User, UserId,
};
pub use responses::{
    AlbumSummary, ArtistSummary, DetailResponse, FeedEntry, LibraryEnvelope, PlayableItem,
    PlaylistSummary, PodcastSummary, SearchEnvelope, UserProfile,
};
