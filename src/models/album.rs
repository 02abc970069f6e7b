//! Album-related models.
//!
//! The same structure describes a full album (with volumes) and the album
//! references nested in a track's `albums` list; the latter simply have no
//! volumes.

use serde::{Deserialize, Serialize};

use super::common::{decorate_title, ArtistRef, Id, Label};
use super::track::TrackEntry;

/// An album record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Album identifier.
    pub id: Id,

    /// Album title.
    pub title: String,

    /// Credited artists, composers included.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,

    /// Release year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Record labels.
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Version suffix, e.g. "Deluxe Edition".
    #[serde(default)]
    pub version: Option<String>,

    /// Cover URI with a `%%` size placeholder, without scheme.
    #[serde(default)]
    pub cover_uri: Option<String>,

    /// Genre slug, e.g. "rock".
    #[serde(default)]
    pub genre: Option<String>,

    /// Number of tracks reported by the service.
    #[serde(default)]
    pub track_count: Option<u32>,

    /// Ordered volumes (discs), each an ordered list of tracks.
    #[serde(default)]
    pub volumes: Vec<Vec<TrackEntry>>,
}

impl Album {
    /// Title with the version suffix appended.
    pub fn display_title(&self) -> String {
        decorate_title(&self.title, self.version.as_deref())
    }

    /// Labels joined with ", ".
    pub fn labels_string(&self) -> String {
        self.labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Year as text, empty when unknown.
    pub fn year_string(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }

    /// Total number of tracks across all volumes.
    pub fn total_tracks(&self) -> usize {
        self.volumes.iter().map(Vec::len).sum()
    }

    /// Total duration of all volumes in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.volumes
            .iter()
            .flatten()
            .map(TrackEntry::duration_ms)
            .sum()
    }
}
