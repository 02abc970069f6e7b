//! Unified downloader interface.
//!
//! [`Ymdl`] turns a music URL into files on disk: it resolves the entity,
//! walks albums, volumes and playlists, assigns track numbers and names,
//! downloads every track and tags it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::api::MusicApi;
use crate::config::{DownloadConfig, Endpoints};
use crate::cover::{self, CoverArt};
use crate::download::FileDownloader;
use crate::error::{Result, YmdlError};
use crate::link::{self, ArtistView, Link};
use crate::m3u;
use crate::models::{split_artists, Album, Artist, ArtistCatalog, Id, Playlist, Track, TrackEntry};
use crate::naming::{self, NameFields};
use crate::tagging::{LoftyTagWriter, TagWriter, TrackTags};
use crate::utils::{time_to_str, title_case};

/// Width of the album summary header.
const LINE_WIDTH: usize = 79;

/// Result of a single track download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    /// Path of the audio file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Track title, version included.
    pub title: String,
    /// Performers.
    pub artist: String,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// The file was already present and left untouched.
    pub skipped: bool,
}

impl DownloadResult {
    /// Playlist entry pointing at the file relative to its directory.
    pub fn extinf(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        m3u::make_extinf(self.duration_ms, &self.artist, &self.title, &name)
    }
}

/// Result of downloading a set of tracks (album, playlist, artist).
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Output directory.
    pub directory: PathBuf,
    /// Newly downloaded tracks.
    pub successful: Vec<DownloadResult>,
    /// Tracks that were already present.
    pub skipped: Vec<DownloadResult>,
    /// Failed tracks with error messages.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            successful: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Total number of tracks attempted.
    pub fn total(&self) -> usize {
        self.successful.len() + self.skipped.len() + self.failed.len()
    }

    /// Check if no track failed.
    pub fn all_successful(&self) -> bool {
        self.failed.is_empty()
    }

    /// Append the outcome of another set.
    pub fn merge(&mut self, other: BatchReport) {
        self.successful.extend(other.successful);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    fn record(&mut self, result: DownloadResult) {
        if result.skipped {
            self.skipped.push(result);
        } else {
            self.successful.push(result);
        }
    }
}

/// Where a track sits in the set being downloaded.
#[derive(Debug, Clone, Copy)]
struct Slot {
    number: usize,
    total: usize,
    volume: Option<u32>,
}

/// A track to download: already fetched, or known only by id.
#[derive(Debug, Clone, Copy)]
enum TrackSource<'a> {
    Entry(&'a TrackEntry),
    Id(&'a Id),
}

impl TrackSource<'_> {
    fn label(&self) -> String {
        match self {
            TrackSource::Entry(entry) => entry
                .0
                .get("title")
                .and_then(|t| t.as_str())
                .map(str::to_string)
                .or_else(|| {
                    entry
                        .0
                        .get("id")
                        .and_then(|id| Id::deserialize(id).ok())
                        .map(|id| format!("track {}", id))
                })
                .unwrap_or_else(|| "unknown track".to_string()),
            TrackSource::Id(id) => format!("track {}", id),
        }
    }
}

/// Covers shared by every track of an album.
#[derive(Debug, Clone, Default)]
struct AlbumCovers {
    /// Saved into each volume directory.
    folder: Option<CoverArt>,
    /// Embedded into tags.
    tag: Option<CoverArt>,
}

/// Main downloader interface.
///
/// # Example
///
/// ```rust,no_run
/// use ymdl::{DownloadConfig, Endpoints, Ymdl};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let ymdl = Ymdl::new(DownloadConfig::with_output_dir("music"), Endpoints::default())?;
///
///     let report = ymdl
///         .download_url("https://music.yandex.ru/album/302127")
///         .await?;
///     println!("Downloaded {} tracks", report.successful.len());
///
///     Ok(())
/// }
/// ```
pub struct Ymdl {
    api: MusicApi,
    downloader: FileDownloader,
    tagger: Arc<dyn TagWriter>,
    config: DownloadConfig,
}

impl Ymdl {
    /// Create a downloader writing real ID3 tags.
    pub fn new(config: DownloadConfig, endpoints: Endpoints) -> Result<Self> {
        let api = MusicApi::new(endpoints)?;
        Ok(Self::with_api(api, config, Arc::new(LoftyTagWriter)))
    }

    /// Create a downloader from its parts.
    pub fn with_api(api: MusicApi, config: DownloadConfig, tagger: Arc<dyn TagWriter>) -> Self {
        let downloader =
            FileDownloader::new(api.client().clone(), config.quiet, config.check_disk_space);
        Self {
            api,
            downloader,
            tagger,
            config,
        }
    }

    pub fn api(&self) -> &MusicApi {
        &self.api
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    fn track_template<'a>(&'a self, default: &'a str) -> &'a str {
        self.config.track_name.as_deref().unwrap_or(default)
    }

    fn album_template<'a>(&'a self, default: &'a str) -> &'a str {
        self.config.album_name.as_deref().unwrap_or(default)
    }

    /// Download whatever `url` points to.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if the URL is not a recognized music link
    /// - `SimilarArtists` for a list of similar artists
    /// - `Remote` / `Schema` if metadata of the entity can't be fetched
    pub async fn download_url(&self, url: &str) -> Result<BatchReport> {
        match link::classify(url)? {
            Link::Track { id } => {
                let track = self.api.get_track(&id).await?;
                self.download_single_track(&track).await
            }
            Link::Album { id } => {
                let album = self.api.get_album(&id).await?;
                self.download_album(
                    &album,
                    &self.config.output_dir,
                    self.album_template(naming::SINGLE_ALBUM_DIR),
                    None,
                )
                .await
            }
            Link::Artist {
                id,
                view: ArtistView::Similar,
            } => {
                let artist = self.api.get_artist_name(&id, ArtistView::Similar).await?;
                Err(YmdlError::SimilarArtists {
                    url: url.to_string(),
                    artist,
                })
            }
            Link::Artist { id, view } => {
                let artist = self.api.get_artist(&id, view).await?;
                self.download_artist(&artist).await
            }
            Link::Playlist { owner, kind } => {
                let playlist = self.api.get_playlist(&owner, &kind).await?;
                self.download_playlist(&playlist).await
            }
        }
    }

    /// Download one track into the output directory.
    pub async fn download_single_track(&self, track: &Track) -> Result<BatchReport> {
        let dir = self.config.output_dir.clone();
        let template = self.track_template(naming::SINGLE_TRACK);
        let result = self.download_track(track, &dir, template, None, None).await?;

        let mut report = BatchReport::new(dir);
        report.record(result);
        Ok(report)
    }

    /// Download and tag one track into `dir`.
    async fn download_track(
        &self,
        track: &Track,
        dir: &Path,
        template: &str,
        slot: Option<Slot>,
        shared_cover: Option<&CoverArt>,
    ) -> Result<DownloadResult> {
        let album = track.album()?;
        let (artist, composer) = split_artists(&track.artists);
        let title = track.display_title();
        let album_title = album.display_title();

        let (track_number, track_count) = match slot {
            Some(slot) => (
                naming::pad_track_number(slot.number, slot.total),
                slot.total.to_string(),
            ),
            None => (
                String::new(),
                album.track_count.map(|n| n.to_string()).unwrap_or_default(),
            ),
        };
        let fields = NameFields {
            title: title.clone(),
            artist: artist.clone(),
            album: album_title.clone(),
            track_number,
            track_count,
            year: album.year_string(),
            label: album.labels_string(),
        };
        let path = dir.join(naming::track_file_name(template, &fields));

        match slot {
            Some(slot) => info!(
                "[{}/{}] {} ({})",
                slot.number,
                slot.total,
                title,
                time_to_str(track.duration_ms)
            ),
            None => info!("{} ({})", title, time_to_str(track.duration_ms)),
        }
        info!("by {}", artist);

        let mut result = DownloadResult {
            path: path.clone(),
            size: 0,
            title: title.clone(),
            artist: artist.clone(),
            duration_ms: track.duration_ms,
            skipped: false,
        };

        if let Ok(meta) = tokio::fs::metadata(&path).await {
            info!("{} already exists", path.display());
            result.size = meta.len();
            result.skipped = true;
            return Ok(result);
        }

        let url = self.api.resolve_media_url(track).await?;
        match self.downloader.download(&url, &path).await {
            Ok(outcome) => result.size = outcome.size,
            Err(YmdlError::AlreadyExists(existing)) => {
                info!("{} already exists", existing.display());
                result.skipped = true;
                return Ok(result);
            }
            Err(e) => return Err(e),
        }

        let fetched_cover = match (shared_cover, &album.cover_uri) {
            (None, Some(uri)) => {
                CoverArt::fetch(
                    self.api.client(),
                    &self.api.endpoints().cover,
                    uri,
                    self.config.cover_id3_size,
                )
                .await
            }
            _ => None,
        };
        let cover = shared_cover.or(fetched_cover.as_ref());

        let mut tags = TrackTags::new()
            .with_title(title)
            .with_artists(artist, composer)
            .with_album(album_title, album.labels_string())
            .with_year(album.year)
            .with_genre(if self.config.genre {
                album.genre.as_deref().map(title_case)
            } else {
                None
            });
        if let Some(slot) = slot {
            tags = tags
                .with_track(slot.number as u32, slot.total as u32)
                .with_volume(slot.volume);
        }

        if let Err(e) = self.write_tags(&path, tags, cover).await {
            error!("Can't write ID3: {}", e);
        }

        Ok(result)
    }

    async fn write_tags(&self, path: &Path, tags: TrackTags, cover: Option<&CoverArt>) -> Result<()> {
        let tagger = Arc::clone(&self.tagger);
        let path = path.to_path_buf();
        let cover = cover.cloned();
        tokio::task::spawn_blocking(move || tagger.write(&path, &tags, cover.as_ref()))
            .await
            .map_err(|e| YmdlError::Tagging(e.to_string()))?
    }

    async fn resolve_track(&self, source: TrackSource<'_>) -> Result<Track> {
        match source {
            TrackSource::Entry(entry) => entry.decode(),
            TrackSource::Id(id) => self.api.get_track(id.as_str()).await,
        }
    }

    /// Download a numbered set of tracks into `dir`.
    ///
    /// A failing track is logged and recorded; the rest of the set continues.
    async fn download_tracks(
        &self,
        sources: &[TrackSource<'_>],
        dir: &Path,
        template: &str,
        total: usize,
        volume: Option<u32>,
        shared_cover: Option<&CoverArt>,
    ) -> Result<BatchReport> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| YmdlError::persistence(dir, e))?;

        let mut report = BatchReport::new(dir);
        let mut extinfs = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            let slot = Slot {
                number: index + 1,
                total,
                volume,
            };
            let result = match self.resolve_track(*source).await {
                Ok(track) => {
                    self.download_track(&track, dir, template, Some(slot), shared_cover)
                        .await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(result) => {
                    extinfs.push(result.extinf());
                    report.record(result);
                }
                Err(e) => {
                    let label = source.label();
                    error!("Can't download {}: {}", label, e);
                    report.failed.push((label, e.to_string()));
                }
            }
        }

        if self.config.m3u {
            if let Err(e) = m3u::save_m3u(&extinfs, dir).await {
                error!("Can't save M3U: {}", e);
            }
        }

        Ok(report)
    }

    async fn album_covers(&self, album: &Album) -> AlbumCovers {
        let Some(uri) = &album.cover_uri else {
            return AlbumCovers::default();
        };
        let client = self.api.client();
        let template = &self.api.endpoints().cover;

        let folder = CoverArt::fetch(client, template, uri, self.config.cover_size).await;
        let tag = if cover::select_size(self.config.cover_id3_size)
            == cover::select_size(self.config.cover_size)
        {
            folder.clone()
        } else {
            CoverArt::fetch(client, template, uri, self.config.cover_id3_size).await
        };
        AlbumCovers { folder, tag }
    }

    fn log_album_summary(album: &Album, position: Option<(usize, usize)>) {
        let header = position
            .map(|(current, total)| format!(" {}/{} ", current, total))
            .unwrap_or_default();
        let (artist, _) = split_artists(&album.artists);

        info!("{:=^width$}", header, width = LINE_WIDTH);
        info!("Album    {}", album.display_title());
        info!("Artist   {}", artist);
        if let Some(year) = album.year {
            info!("Year     {}", year);
        }
        if !album.labels.is_empty() {
            info!("Label    {}", album.labels_string());
        }
        info!("Tracks   {}", album.total_tracks());
        info!("Volumes  {}", album.volumes.len());
        info!("Length   {}", time_to_str(album.total_duration_ms()));
        info!("{}", "=".repeat(LINE_WIDTH));
    }

    /// Download an album into a directory named by `template` under `dir`.
    ///
    /// `position` is `(current, total)` when the album is one of an
    /// artist's albums.
    pub async fn download_album(
        &self,
        album: &Album,
        dir: &Path,
        template: &str,
        position: Option<(usize, usize)>,
    ) -> Result<BatchReport> {
        if album.volumes.is_empty() {
            info!("Album \"{}\" is empty.", album.title);
            return Ok(BatchReport::new(dir));
        }

        let (artist, _) = split_artists(&album.artists);
        let total = album.total_tracks();
        let fields = NameFields {
            artist,
            album: album.display_title(),
            track_count: total.to_string(),
            year: album.year_string(),
            label: album.labels_string(),
            ..Default::default()
        };
        let album_dir = dir.join(naming::dir_name(template, &fields));
        let covers = self.album_covers(album).await;

        Self::log_album_summary(album, position);

        let template = self.track_template(naming::ALBUM_TRACK);
        let nvolumes = album.volumes.len();
        let mut report = BatchReport::new(&album_dir);

        for (index, volume) in album.volumes.iter().enumerate() {
            let (volume_dir, volume_number) = if nvolumes == 1 {
                (album_dir.clone(), None)
            } else {
                let name =
                    naming::volume_dir_name(&self.config.volume_prefix, index + 1, nvolumes);
                (album_dir.join(name), Some(index as u32 + 1))
            };

            if let Some(cover) = &covers.folder {
                if let Err(e) = cover.save(&volume_dir).await {
                    error!("Can't save cover: {}", e);
                }
            }

            let sources: Vec<TrackSource> = volume.iter().map(TrackSource::Entry).collect();
            let volume_report = self
                .download_tracks(
                    &sources,
                    &volume_dir,
                    template,
                    total,
                    volume_number,
                    covers.tag.as_ref(),
                )
                .await?;
            report.merge(volume_report);
        }

        Ok(report)
    }

    /// Download an artist's tracks or albums into `<out>/<artist name>`.
    pub async fn download_artist(&self, artist: &Artist) -> Result<BatchReport> {
        let dir = self.config.output_dir.join(naming::sanitize(artist.name()));

        match &artist.catalog {
            ArtistCatalog::Tracks { track_ids } => {
                let sources: Vec<TrackSource> = track_ids.iter().map(TrackSource::Id).collect();
                self.download_tracks(
                    &sources,
                    &dir,
                    self.track_template(naming::ARTIST_TRACK),
                    sources.len(),
                    None,
                    None,
                )
                .await
            }
            ArtistCatalog::Albums {
                album_ids,
                also_album_ids,
            } => {
                let ids = if self.config.also {
                    also_album_ids
                } else {
                    album_ids
                };
                let template = self.album_template(naming::ARTIST_ALBUM_DIR);
                let mut report = BatchReport::new(&dir);

                for (index, id) in ids.iter().enumerate() {
                    let position = Some((index + 1, ids.len()));
                    let album = match self.api.get_album(id.as_str()).await {
                        Ok(album) => album,
                        Err(e) => {
                            warn!("Can't fetch album {}: {}", id, e);
                            report.failed.push((format!("album {}", id), e.to_string()));
                            continue;
                        }
                    };
                    match self.download_album(&album, &dir, template, position).await {
                        Ok(album_report) => report.merge(album_report),
                        Err(e) => {
                            error!("Can't download album \"{}\": {}", album.title, e);
                            report.failed.push((album.title.clone(), e.to_string()));
                        }
                    }
                }

                Ok(report)
            }
        }
    }

    /// Download a playlist into `<out>/<playlist title>`.
    pub async fn download_playlist(&self, playlist: &Playlist) -> Result<BatchReport> {
        let dir = self.config.output_dir.join(naming::sanitize(&playlist.title));
        let tracks = playlist.playable_tracks();
        if tracks.is_empty() {
            info!("Playlist \"{}\" is empty.", playlist.title);
            return Ok(BatchReport::new(dir));
        }

        if let Some(uri) = playlist.picture_uri() {
            let cover = CoverArt::fetch(
                self.api.client(),
                &self.api.endpoints().cover,
                uri,
                self.config.cover_size,
            )
            .await;
            if let Some(cover) = cover {
                if let Err(e) = cover.save(&dir).await {
                    error!("Can't save cover: {}", e);
                }
            }
        }

        let sources: Vec<TrackSource> = tracks.into_iter().map(TrackSource::Entry).collect();
        self.download_tracks(
            &sources,
            &dir,
            self.track_template(naming::PLAYLIST_TRACK),
            sources.len(),
            None,
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        album_json, endpoints_for, media_body, mount_media, track_json, RecordingTagger,
    };
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ymdl(server: &MockServer, config: DownloadConfig) -> (Ymdl, Arc<RecordingTagger>) {
        let tagger = Arc::new(RecordingTagger::default());
        let api = MusicApi::new(endpoints_for(server)).unwrap();
        let ymdl = Ymdl::with_api(api, config, tagger.clone());
        (ymdl, tagger)
    }

    fn config(out: &Path) -> DownloadConfig {
        let mut config = DownloadConfig::with_output_dir(out);
        config.quiet = true;
        config.check_disk_space = false;
        config.cover_size = 0;
        config.cover_id3_size = 0;
        config
    }

    #[test]
    fn test_failure_label_of_untitled_entry() {
        let text_id = TrackEntry(json!({"id": "abc"}));
        assert_eq!(TrackSource::Entry(&text_id).label(), "track abc");

        let number_id = TrackEntry(json!({"id": 42}));
        assert_eq!(TrackSource::Entry(&number_id).label(), "track 42");

        let titled = TrackEntry(json!({"id": 1, "title": "Song"}));
        assert_eq!(TrackSource::Entry(&titled).label(), "Song");

        assert_eq!(TrackSource::Entry(&TrackEntry(json!({}))).label(), "unknown track");
    }

    #[tokio::test]
    async fn test_single_track_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handlers/track.jsx"))
            .and(query_param("track", "42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"track": track_json(42, "Song")})),
            )
            .mount(&server)
            .await;
        mount_media(&server, 42).await;

        let out = tempdir().unwrap();
        let (ymdl, tagger) = ymdl(&server, config(out.path()));
        let report = ymdl
            .download_url("https://music.yandex.ru/album/900/track/42")
            .await
            .unwrap();

        let expected = out.path().join("Band - Song.mp3");
        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.successful[0].path, expected);
        assert_eq!(std::fs::read(&expected).unwrap(), media_body(42));

        let written = tagger.sorted();
        assert_eq!(written.len(), 1);
        let tags = &written[0].1;
        assert_eq!(tags.title, "Song");
        assert_eq!(tags.album, "Album");
        assert_eq!(tags.publisher, "Label");
        assert_eq!(tags.track_number, None);
        assert_eq!(tags.genre, None);
    }

    #[tokio::test]
    async fn test_existing_track_is_skipped_without_requests() {
        let server = MockServer::start().await;
        let out = tempdir().unwrap();
        std::fs::write(out.path().join("Band - Song.mp3"), b"old").unwrap();

        let (ymdl, tagger) = ymdl(&server, config(out.path()));
        let track: Track = serde_json::from_value(track_json(42, "Song")).unwrap();
        let report = ymdl.download_single_track(&track).await.unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert!(report.successful.is_empty());
        assert!(tagger.sorted().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multi_volume_album_numbering() {
        let server = MockServer::start().await;
        for id in 1..=8 {
            mount_media(&server, id).await;
        }

        let out = tempdir().unwrap();
        let mut cfg = config(out.path());
        cfg.m3u = true;
        cfg.genre = true;
        let (ymdl, tagger) = ymdl(&server, cfg);

        let album: Album = serde_json::from_value(album_json(900, "Album", &[5, 3], 1)).unwrap();
        let report = ymdl
            .download_album(&album, out.path(), naming::SINGLE_ALBUM_DIR, None)
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 8);
        assert!(report.all_successful());

        let album_dir = out.path().join("Band - Album (2001)");
        assert!(album_dir.join("CD1").join("05 - Track 5.mp3").exists());
        assert!(album_dir.join("CD2").join("01 - Track 6.mp3").exists());
        assert!(album_dir.join("CD2").join("03 - Track 8.mp3").exists());
        assert!(album_dir.join("CD1").join("play.m3u8").exists());

        let written = tagger.sorted();
        let numbers: Vec<(Option<u32>, Option<u32>)> = written
            .iter()
            .map(|(_, tags, _)| (tags.volume, tags.track_number))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (Some(1), Some(1)),
                (Some(1), Some(2)),
                (Some(1), Some(3)),
                (Some(1), Some(4)),
                (Some(1), Some(5)),
                (Some(2), Some(1)),
                (Some(2), Some(2)),
                (Some(2), Some(3)),
            ]
        );
        assert!(written.iter().all(|(_, tags, _)| tags.track_total == Some(8)));
        assert!(written
            .iter()
            .all(|(_, tags, _)| tags.genre.as_deref() == Some("Rock")));
    }

    #[tokio::test]
    async fn test_single_volume_album_has_no_volume_dir() {
        let server = MockServer::start().await;
        for id in 1..=2 {
            mount_media(&server, id).await;
        }

        let out = tempdir().unwrap();
        let (ymdl, tagger) = ymdl(&server, config(out.path()));
        let album: Album = serde_json::from_value(album_json(900, "Album", &[2], 1)).unwrap();
        ymdl.download_album(&album, out.path(), "%A", None)
            .await
            .unwrap();

        assert!(out.path().join("Album").join("01 - Track 1.mp3").exists());
        assert!(tagger.sorted().iter().all(|(_, tags, _)| tags.volume.is_none()));
    }

    #[tokio::test]
    async fn test_empty_album_is_noop() {
        let server = MockServer::start().await;
        let out = tempdir().unwrap();
        let (ymdl, tagger) = ymdl(&server, config(out.path()));

        let album: Album = serde_json::from_value(album_json(900, "Album", &[], 1)).unwrap();
        let report = ymdl
            .download_album(&album, out.path(), naming::SINGLE_ALBUM_DIR, None)
            .await
            .unwrap();

        assert_eq!(report.total(), 0);
        assert!(tagger.sorted().is_empty());
        assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_album_cover_saved_and_embedded() {
        let server = MockServer::start().await;
        mount_media(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/covers/700x700"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![1, 2, 3]),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/covers/300x300"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![4, 5]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = tempdir().unwrap();
        let mut cfg = config(out.path());
        cfg.cover_size = 700;
        cfg.cover_id3_size = 300;
        let (ymdl, tagger) = ymdl(&server, cfg);

        let mut json = album_json(900, "Album", &[1], 1);
        json["coverUri"] = json!(format!("{}/covers/%%", server.address()));
        let album: Album = serde_json::from_value(json).unwrap();
        ymdl.download_album(&album, out.path(), "%A", None)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(out.path().join("Album").join("cover.jpg")).unwrap(),
            vec![1, 2, 3]
        );
        let written = tagger.sorted();
        assert_eq!(written.len(), 1);
        assert!(written[0].2);
    }

    #[tokio::test]
    async fn test_playlist_skips_unplayable_entries() {
        let server = MockServer::start().await;
        mount_media(&server, 11).await;
        mount_media(&server, 13).await;

        let out = tempdir().unwrap();
        let mut cfg = config(out.path());
        cfg.m3u = true;
        let (ymdl, tagger) = ymdl(&server, cfg);

        let playlist: Playlist = serde_json::from_value(json!({
            "title": "Road: Mix?",
            "tracks": [
                track_json(11, "First"),
                {"id": 12, "title": "Gone", "error": "no-rights"},
                track_json(13, "Third")
            ]
        }))
        .unwrap();
        let report = ymdl.download_playlist(&playlist).await.unwrap();

        let dir = out.path().join("Road Mix");
        assert_eq!(report.successful.len(), 2);
        assert!(dir.join("01 - Band - First.mp3").exists());
        assert!(dir.join("02 - Band - Third.mp3").exists());

        let numbers: Vec<Option<u32>> = tagger
            .sorted()
            .iter()
            .map(|(_, tags, _)| tags.track_number)
            .collect();
        assert_eq!(numbers, vec![Some(1), Some(2)]);

        let m3u = std::fs::read_to_string(dir.join("play.m3u8")).unwrap();
        assert_eq!(m3u.matches("#EXTINF").count(), 2);
        assert!(m3u.contains("#EXTINF:180,Band - Third\n02 - Band - Third.mp3\n"));
    }

    #[tokio::test]
    async fn test_empty_playlist_is_noop() {
        let server = MockServer::start().await;
        let out = tempdir().unwrap();
        let (ymdl, _) = ymdl(&server, config(out.path()));

        let playlist: Playlist = serde_json::from_value(json!({
            "title": "Empty",
            "tracks": [{"id": 1, "error": "no-rights"}]
        }))
        .unwrap();
        let report = ymdl.download_playlist(&playlist).await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(!out.path().join("Empty").exists());
    }

    #[tokio::test]
    async fn test_broken_track_does_not_stop_siblings() {
        let server = MockServer::start().await;
        mount_media(&server, 1).await;
        mount_media(&server, 3).await;

        let out = tempdir().unwrap();
        let mut cfg = config(out.path());
        cfg.m3u = true;
        let (ymdl, _) = ymdl(&server, cfg);

        let mut json = album_json(900, "Album", &[3], 1);
        json["volumes"][0][1]
            .as_object_mut()
            .unwrap()
            .remove("storageDir");
        let album: Album = serde_json::from_value(json).unwrap();
        let report = ymdl
            .download_album(&album, out.path(), "%A", None)
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Track 2");
        assert!(out.path().join("Album").join("03 - Track 3.mp3").exists());

        let m3u = std::fs::read_to_string(out.path().join("Album").join("play.m3u8")).unwrap();
        assert_eq!(m3u.matches("#EXTINF").count(), 2);
    }

    #[tokio::test]
    async fn test_artist_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handlers/artist.jsx"))
            .and(query_param("what", "tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artist": {"name": "AC/DC"},
                "trackIds": ["21", 22]
            })))
            .mount(&server)
            .await;
        for id in [21u64, 22] {
            Mock::given(method("GET"))
                .and(path("/handlers/track.jsx"))
                .and(query_param("track", id.to_string().as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(
                    json!({"track": track_json(id, &format!("Song {}", id))}),
                ))
                .mount(&server)
                .await;
            mount_media(&server, id).await;
        }

        let out = tempdir().unwrap();
        let (ymdl, tagger) = ymdl(&server, config(out.path()));
        let report = ymdl
            .download_url("https://music.yandex.ru/artist/7/tracks")
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 2);
        assert!(out.path().join("AC-DC").join("Song 21.mp3").exists());
        assert!(out.path().join("AC-DC").join("Song 22.mp3").exists());
        let totals: Vec<Option<u32>> = tagger
            .sorted()
            .iter()
            .map(|(_, tags, _)| tags.track_total)
            .collect();
        assert_eq!(totals, vec![Some(2), Some(2)]);
    }

    #[tokio::test]
    async fn test_artist_also_albums() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handlers/artist.jsx"))
            .and(query_param("what", "albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artist": {"name": "Band"},
                "albumIds": [901],
                "alsoAlbumIds": [902]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/handlers/album.jsx"))
            .and(query_param("album", "902"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(album_json(902, "Guest", &[1], 31)),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_media(&server, 31).await;

        let out = tempdir().unwrap();
        let mut cfg = config(out.path());
        cfg.also = true;
        let (ymdl, _) = ymdl(&server, cfg);
        let report = ymdl
            .download_url("https://music.yandex.ru/artist/7")
            .await
            .unwrap();

        assert_eq!(report.successful.len(), 1);
        assert!(out
            .path()
            .join("Band")
            .join("2001 - Guest")
            .join("01 - Track 31.mp3")
            .exists());
    }

    #[tokio::test]
    async fn test_similar_artists_url_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handlers/artist.jsx"))
            .and(query_param("what", "similar"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artist": {"name": "Band"},
                "similarArtists": []
            })))
            .mount(&server)
            .await;

        let out = tempdir().unwrap();
        let (ymdl, _) = ymdl(&server, config(out.path()));
        let url = "https://music.yandex.ru/artist/7/similar";
        match ymdl.download_url(url).await {
            Err(YmdlError::SimilarArtists { url: got, artist }) => {
                assert_eq!(got, url);
                assert_eq!(artist, "Band");
            }
            other => panic!("expected similar artists error, got {:?}", other.map(|r| r.total())),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let server = MockServer::start().await;
        let out = tempdir().unwrap();
        let (ymdl, _) = ymdl(&server, config(out.path()));

        let err = ymdl
            .download_url("https://example.com/album/1")
            .await
            .unwrap_err();
        assert!(matches!(err, YmdlError::InvalidUrl(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
