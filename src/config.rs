//! Download configuration.
//!
//! [`DownloadConfig`] carries everything the command line decides (output
//! directory, naming overrides, cover sizes, flags) and is threaded through
//! every download call. [`Endpoints`] holds the remote URL templates, which
//! tests point at a local mock server.

use std::path::PathBuf;
use std::time::Duration;

/// Default prefix of album volume folders.
pub const DEFAULT_VOLUME_PREFIX: &str = "CD";

/// Default size of the cover saved to the album folder.
pub const DEFAULT_COVER_SIZE: i64 = 700;

/// Default size of the cover embedded in tags.
pub const DEFAULT_COVER_ID3_SIZE: i64 = 300;

/// Timeout of metadata handler requests.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(6);

/// User-visible download settings.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Root output directory.
    pub output_dir: PathBuf,
    /// Suppress progress and informational output.
    pub quiet: bool,
    /// Track name template override.
    pub track_name: Option<String>,
    /// Album directory name template override.
    pub album_name: Option<String>,
    /// Prefix of album volume folders.
    pub volume_prefix: String,
    /// Size of the cover saved next to the tracks; zero or less disables it.
    pub cover_size: i64,
    /// Size of the cover embedded in tags; zero or less disables it.
    pub cover_id3_size: i64,
    /// For artists, download secondary releases instead of the main albums.
    pub also: bool,
    /// Write the genre tag.
    pub genre: bool,
    /// Write a `play.m3u8` playlist next to each downloaded track set.
    pub m3u: bool,
    /// Refuse to start a fresh download when the volume lacks space for it.
    pub check_disk_space: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            quiet: false,
            track_name: None,
            album_name: None,
            volume_prefix: DEFAULT_VOLUME_PREFIX.to_string(),
            cover_size: DEFAULT_COVER_SIZE,
            cover_id3_size: DEFAULT_COVER_ID3_SIZE,
            also: false,
            genre: false,
            m3u: false,
            check_disk_space: true,
        }
    }
}

impl DownloadConfig {
    /// Config writing into `output_dir` with everything else at defaults.
    pub fn with_output_dir<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }
}

/// Remote URL templates.
///
/// Placeholders are written as `{name}` and substituted with
/// URL-encoded values.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// `{track}`
    pub track: String,
    /// `{album}`
    pub album: String,
    /// `{artist}`, `{what}`
    pub artist: String,
    /// `{users}`, `{playlists}`
    pub playlist: String,
    /// `{storageDir}`
    pub source_info: String,
    /// `{host}`, `{md5}`, `{ts}`, `{path}`
    pub media: String,
    /// `{uri}`
    pub cover: String,
    /// Timeout of every metadata request.
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base("https://music.yandex.ru", "https://storage.mds.yandex.net")
    }
}

impl Endpoints {
    /// Endpoints for the given handler and storage base URLs.
    pub fn with_base(music: &str, storage: &str) -> Self {
        Self {
            track: format!("{}/handlers/track.jsx?track={{track}}", music),
            album: format!("{}/handlers/album.jsx?album={{album}}", music),
            artist: format!(
                "{}/handlers/artist.jsx?artist={{artist}}&what={{what}}",
                music
            ),
            playlist: format!(
                "{}/handlers/playlist.jsx?owner={{users}}&kinds={{playlists}}",
                music
            ),
            source_info: format!(
                "{}/download-info/{{storageDir}}/2?format=json",
                storage
            ),
            media: "https://{host}/get-mp3/{md5}/{ts}/{path}".to_string(),
            cover: "https://{uri}".to_string(),
            timeout: METADATA_TIMEOUT,
        }
    }
}

/// Substitute `{key}` placeholders in `template`.
pub(crate) fn fill(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}
