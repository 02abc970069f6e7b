//! Data models for Yandex.Music handler responses.
//!
//! This module contains the structures used to represent tracks, albums,
//! playlists and artists as the service returns them, plus the helpers
//! that turn raw JSON into those structures.

pub mod album;
pub mod artist;
pub mod common;
pub mod playlist;
pub mod track;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, YmdlError};

// Re-exports for convenience
pub use album::Album;
pub use artist::{Artist, ArtistCatalog, ArtistSummary};
pub use common::{decorate_title, split_artists, ArtistRef, Id, Label};
pub use playlist::{Playlist, PlaylistCover};
pub use track::{Track, TrackEntry};

/// Decode a JSON value into a model, reporting shape mismatches as schema errors.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| YmdlError::Schema(format!("{}: {}", what, e)))
}

/// Take a required top-level key out of a response object.
pub(crate) fn take_field(mut value: Value, key: &str) -> Result<Value> {
    value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| YmdlError::Schema(format!("missing field `{}`", key)))
}
