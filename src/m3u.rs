//! Extended M3U playlists of downloaded tracks.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, YmdlError};

/// Name of the playlist file written next to the tracks.
pub const M3U_FILE_NAME: &str = "play.m3u8";

const HEADER: &str = "#EXTM3U\n";
const BOM: &str = "\u{feff}";

/// One `#EXTINF` entry: duration in whole seconds, display name and path.
pub fn make_extinf(duration_ms: u64, artists: &str, title: &str, path: &str) -> String {
    format!(
        "#EXTINF:{},{} - {}\n{}\n",
        duration_ms / 1000,
        artists,
        title,
        path
    )
}

/// Write `entries` as `play.m3u8` in `dir`.
///
/// Nothing is written when there are no entries.
pub async fn save_m3u(entries: &[String], dir: &Path) -> Result<Option<PathBuf>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut content = String::from(BOM);
    content.push_str(HEADER);
    for entry in entries {
        content.push_str(entry);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| YmdlError::persistence(dir, e))?;
    let path = dir.join(M3U_FILE_NAME);
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| YmdlError::persistence(&path, e))?;
    debug!("Saved playlist {} ({} entries)", path.display(), entries.len());
    Ok(Some(path))
}
