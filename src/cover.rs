//! Album and playlist cover art.
//!
//! Covers are served in a fixed set of square sizes. A requested size is
//! rounded up to the nearest available one, so the image is never smaller
//! than asked for unless the request exceeds the largest size.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::fill;
use crate::error::{Result, YmdlError};

/// Square sizes the cover service provides, ascending.
pub const COVER_SIZES: [u32; 15] = [
    30, 40, 50, 75, 80, 100, 150, 160, 200, 300, 400, 460, 600, 700, 1000,
];

/// Placeholder for `NxN` in cover URIs.
const SIZE_PLACEHOLDER: &str = "%%";

/// Base name of persisted cover files.
const COVER_FILE_STEM: &str = "cover";

/// MIME type assumed when the server sends none.
const DEFAULT_MIME: &str = "image/jpeg";

/// A downloaded cover image.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    /// MIME type without parameters, e.g. `image/jpeg`.
    pub mime: String,
    /// File extension with the leading dot, empty if unknown.
    pub extension: String,
}

/// Pick the served size for a requested one.
///
/// Returns `None` for zero or negative sizes, which disable covers.
pub fn select_size(requested: i64) -> Option<u32> {
    if requested <= 0 {
        return None;
    }
    COVER_SIZES
        .iter()
        .copied()
        .find(|&size| i64::from(size) >= requested)
        .or_else(|| COVER_SIZES.last().copied())
}

/// File extension for an image MIME type.
pub fn extension_for_mime(mime: &str) -> String {
    let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
    let known = match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    };
    known
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&essence).and_then(|exts| exts.first().copied())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Cover URL for `uri` at the given size.
pub fn cover_url(template: &str, uri: &str, size: u32) -> String {
    let uri = uri.replace(SIZE_PLACEHOLDER, &format!("{0}x{0}", size));
    fill(template, &[("uri", uri.as_str())])
}

impl CoverArt {
    /// Download the cover at `uri`, sized for `requested`.
    ///
    /// Failures are logged and yield `None`; a missing cover never stops a
    /// download.
    pub async fn fetch(client: &Client, template: &str, uri: &str, requested: i64) -> Option<Self> {
        let size = select_size(requested)?;
        let url = cover_url(template, uri, size);
        match Self::try_fetch(client, &url).await {
            Ok(cover) => {
                debug!("Fetched cover {} ({} bytes)", url, cover.data.len());
                Some(cover)
            }
            Err(e) => {
                warn!("Can't fetch cover {}: {}", url, e);
                None
            }
        }
    }

    async fn try_fetch(client: &Client, url: &str) -> Result<Self> {
        let response = client.get(url).send().await?.error_for_status()?;
        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME.to_string());
        let data = response.bytes().await?.to_vec();

        Ok(Self {
            extension: extension_for_mime(&mime),
            data,
            mime,
        })
    }

    /// File name the cover is persisted under.
    pub fn file_name(&self) -> String {
        format!("{}{}", COVER_FILE_STEM, self.extension)
    }

    /// Write the cover into `dir`, creating it if needed.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| YmdlError::persistence(dir, e))?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.data)
            .await
            .map_err(|e| YmdlError::persistence(&path, e))?;
        debug!("Saved cover to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::endpoints_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_select_size_rounds_up() {
        assert_eq!(select_size(55), Some(75));
        assert_eq!(select_size(75), Some(75));
        assert_eq!(select_size(1), Some(30));
        assert_eq!(select_size(700), Some(700));
    }

    #[test]
    fn test_select_size_disabled() {
        assert_eq!(select_size(0), None);
        assert_eq!(select_size(-5), None);
    }

    #[test]
    fn test_select_size_clamps_to_largest() {
        assert_eq!(select_size(1001), Some(1000));
        assert_eq!(select_size(i64::MAX), Some(1000));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), ".jpg");
        assert_eq!(extension_for_mime("image/png"), ".png");
        assert_eq!(extension_for_mime("IMAGE/PNG; charset=binary"), ".png");
        assert_eq!(extension_for_mime("image/webp"), ".webp");
        assert_eq!(extension_for_mime("application/x-unknown-thing"), "");
    }

    #[test]
    fn test_cover_url() {
        assert_eq!(
            cover_url(
                "https://{uri}",
                "avatars.yandex.net/get-music-content/118/a.b/%%",
                200
            ),
            "https://avatars.yandex.net/get-music-content/118/a.b/200x200"
        );
    }

    #[tokio::test]
    async fn test_fetch_and_save() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/covers/75x75"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let endpoints = endpoints_for(&server);
        let uri = format!("{}/covers/%%", server.address());
        let cover = CoverArt::fetch(&Client::new(), &endpoints.cover, &uri, 55)
            .await
            .unwrap();
        assert_eq!(cover.mime, "image/png");
        assert_eq!(cover.file_name(), "cover.png");

        let dir = tempfile::tempdir().unwrap();
        let saved = cover.save(&dir.path().join("Album")).await.unwrap();
        assert_eq!(saved, dir.path().join("Album").join("cover.png"));
        assert_eq!(std::fs::read(saved).unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[tokio::test]
    async fn test_disabled_size_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let endpoints = endpoints_for(&server);
        let uri = format!("{}/covers/%%", server.address());
        assert!(CoverArt::fetch(&Client::new(), &endpoints.cover, &uri, 0)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let endpoints = endpoints_for(&server);
        let uri = format!("{}/covers/%%", server.address());
        assert!(CoverArt::fetch(&Client::new(), &endpoints.cover, &uri, 300)
            .await
            .is_none());
    }
}
