//! API clients for Yandex.Music.
//!
//! This module provides:
//! - [`MusicApi`]: metadata handlers for tracks, albums, artists and playlists
//! - [`SourceInfo`]: storage lookup and signing of direct media links

pub mod handlers;
pub mod storage;

pub use handlers::MusicApi;
pub use storage::SourceInfo;
