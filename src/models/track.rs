//! Track-related models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::album::Album;
use super::common::{decorate_title, ArtistRef, Id};
use crate::error::{Result, YmdlError};

/// A track record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track identifier.
    pub id: Id,

    /// Track title.
    pub title: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Storage directory used to look up the media file.
    pub storage_dir: String,

    /// Version suffix, e.g. "Remastered".
    #[serde(default)]
    pub version: Option<String>,

    /// Credited artists, composers included.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,

    /// Albums the track belongs to. The first one is authoritative.
    pub albums: Vec<Album>,
}

impl Track {
    /// The album this track is downloaded as part of.
    pub fn album(&self) -> Result<&Album> {
        self.albums
            .first()
            .ok_or_else(|| YmdlError::Schema(format!("track {} has no albums", self.id)))
    }

    /// Title with the version suffix appended.
    pub fn display_title(&self) -> String {
        decorate_title(&self.title, self.version.as_deref())
    }
}

/// One track slot inside an album volume or a playlist.
///
/// Entries are kept as raw JSON until they are about to be downloaded, so a
/// malformed entry fails on its own instead of failing the whole listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TrackEntry(pub Value);

impl TrackEntry {
    /// Entries with an `error` marker (e.g. "no-rights") carry no file information.
    pub fn is_playable(&self) -> bool {
        self.0.get("error").is_none()
    }

    /// Duration without a full decode, for summaries.
    pub fn duration_ms(&self) -> u64 {
        self.0.get("durationMs").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn decode(&self) -> Result<Track> {
        super::decode(self.0.clone(), "track")
    }
}

impl From<Value> for TrackEntry {
    fn from(value: Value) -> Self {
        TrackEntry(value)
    }
}
