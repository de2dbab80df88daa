pub mod activity;
pub mod detail;
pub mod duration;
pub mod library;
pub mod playlists;
pub mod recommendations;
pub mod search;
