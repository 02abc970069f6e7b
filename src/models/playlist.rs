//! Playlist-related models.

use serde::{Deserialize, Serialize};

use super::track::TrackEntry;

/// Playlist cover reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaylistCover {
    /// Cover kind; only "pic" covers point to a single image.
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Cover URI with a `%%` size placeholder.
    #[serde(default)]
    pub uri: Option<String>,
}

/// A public user playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    /// Playlist title.
    pub title: String,

    /// Entries in playlist order, unplayable ones included.
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,

    #[serde(default)]
    pub cover: Option<PlaylistCover>,
}

impl Playlist {
    /// Entries that can actually be downloaded, in playlist order.
    pub fn playable_tracks(&self) -> Vec<&TrackEntry> {
        self.tracks.iter().filter(|t| t.is_playable()).collect()
    }

    /// URI of a single-picture cover, if the playlist has one.
    pub fn picture_uri(&self) -> Option<&str> {
        self.cover
            .as_ref()
            .filter(|c| c.type_ == "pic")
            .and_then(|c| c.uri.as_deref())
    }
}
