//! Storage lookup and direct media links.

use serde::Deserialize;
use tracing::debug;

use super::handlers::MusicApi;
use crate::config::fill;
use crate::crypto;
use crate::error::Result;
use crate::models::{self, Track};

/// Download info of a single media file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceInfo {
    /// Storage host serving the file.
    pub host: String,
    /// File path on the host.
    pub path: String,
    /// Timestamp token.
    pub ts: String,
    /// Signing salt.
    pub s: String,
}

impl SourceInfo {
    /// Path with its leading separator removed.
    pub fn relative_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// Build the signed media link from a `{host}`/`{md5}`/`{ts}`/`{path}` template.
    pub fn media_url(&self, template: &str) -> String {
        let path = self.relative_path();
        let signature = crypto::sign_path(path, &self.s);
        fill(
            template,
            &[
                ("host", self.host.as_str()),
                ("md5", signature.as_str()),
                ("ts", self.ts.as_str()),
                ("path", path),
            ],
        )
    }
}

impl MusicApi {
    /// Get download info for a storage directory.
    pub async fn get_source_info(&self, storage_dir: &str) -> Result<SourceInfo> {
        let json = self
            .get_json(&self.endpoints().source_info, &[("storageDir", storage_dir)])
            .await?;
        models::decode(json, "download-info")
    }

    /// Resolve the direct, signed media link of a track.
    pub async fn resolve_media_url(&self, track: &Track) -> Result<String> {
        let info = self.get_source_info(&track.storage_dir).await?;
        let url = info.media_url(&self.endpoints().media);
        debug!("Media URL for track {}: {}", track.id, url);
        Ok(url)
    }
}
