//! Error types for ymdl.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for all download operations.
#[derive(Debug, Error)]
pub enum YmdlError {
    /// URL has the wrong scheme or host, or an unrecognized path shape.
    #[error("Wrong or unsupported URL: {0}")]
    InvalidUrl(String),

    /// URL points to the list of artists similar to a given one.
    #[error("URL {url} points to artists similar to {artist}. Please select one and give appropriate URL.")]
    SimilarArtists { url: String, artist: String },

    /// HTTP request failed (DNS, connection, timeout, non-2xx status).
    #[error("Request error: {0}")]
    Remote(#[from] reqwest::Error),

    /// Response body is not valid JSON.
    #[error("Malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// An expected key is missing from a decoded response.
    #[error("Seems like API was changed: {0}")]
    Schema(String),

    /// Destination file is already present.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Not enough free space on the destination volume.
    #[error("Not enough space in {}: {required} bytes required, {available} available", path.display())]
    Capacity {
        path: PathBuf,
        required: u64,
        available: u64,
    },

    /// Local write of a cover, playlist or tag failed.
    #[error("Can't write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tag reading or writing failed.
    #[error("Can't write tags: {0}")]
    Tagging(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl YmdlError {
    /// Build a persistence error for `path`.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Network or protocol failure talking to the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::MalformedResponse { .. })
    }

    /// Decoded response lacks an expected field.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

/// Result type alias for ymdl operations.
pub type Result<T> = std::result::Result<T, YmdlError>;
