//! Audio metadata tagging.
//!
//! [`TrackTags`] is the full set of fields computed for one downloaded track.
//! Writing goes through the [`TagWriter`] trait so the downloader does not
//! depend on a particular tag library; [`LoftyTagWriter`] is the real one.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use tracing::debug;

use crate::cover::CoverArt;
use crate::error::{Result, YmdlError};

/// Metadata to embed in a downloaded track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    /// Track title, version included.
    pub title: String,
    /// Performers.
    pub artist: String,
    /// Composers.
    pub composer: String,
    /// Album title, version included.
    pub album: String,
    /// Record labels.
    pub publisher: String,
    /// Position within the volume or playlist, 1-based. Unset for single tracks.
    pub track_number: Option<u32>,
    /// Number of tracks in the set.
    pub track_total: Option<u32>,
    /// Volume number, only for multi-volume albums.
    pub volume: Option<u32>,
    /// Release year.
    pub year: Option<i32>,
    /// Genre, already capitalized.
    pub genre: Option<String>,
}

impl TrackTags {
    /// Create new empty tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title.
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// Set performers and composers.
    pub fn with_artists<S: Into<String>>(mut self, artist: S, composer: S) -> Self {
        self.artist = artist.into();
        self.composer = composer.into();
        self
    }

    /// Set album title and labels.
    pub fn with_album<S: Into<String>>(mut self, album: S, publisher: S) -> Self {
        self.album = album.into();
        self.publisher = publisher.into();
        self
    }

    /// Set track number and total.
    pub fn with_track(mut self, number: u32, total: u32) -> Self {
        self.track_number = Some(number);
        self.track_total = Some(total);
        self
    }

    /// Set volume number.
    pub fn with_volume(mut self, volume: Option<u32>) -> Self {
        self.volume = volume;
        self
    }

    /// Set year.
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Set genre.
    pub fn with_genre(mut self, genre: Option<String>) -> Self {
        self.genre = genre;
        self
    }
}

/// Writes tags into a finished audio file.
pub trait TagWriter: Send + Sync {
    fn write(&self, path: &Path, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<()>;
}

/// Copy `tags` and `cover` into a lofty tag, replacing previous values.
pub fn apply_tags(tag: &mut Tag, tags: &TrackTags, cover: Option<&CoverArt>) {
    let set_text = |tag: &mut Tag, key: ItemKey, value: &str| {
        if value.is_empty() {
            tag.remove_key(&key);
        } else {
            tag.insert_text(key, value.to_string());
        }
    };

    tag.set_title(tags.title.clone());
    set_text(tag, ItemKey::TrackArtist, &tags.artist);
    set_text(tag, ItemKey::Composer, &tags.composer);
    set_text(tag, ItemKey::AlbumTitle, &tags.album);
    set_text(tag, ItemKey::Publisher, &tags.publisher);

    if let Some(number) = tags.track_number {
        tag.set_track(number);
    }
    if let Some(total) = tags.track_total {
        tag.set_track_total(total);
    }

    if let Some(volume) = tags.volume {
        tag.set_disk(volume);
    }

    if let Some(year) = tags.year {
        if year > 0 {
            tag.set_year(year as u32);
        }
    }

    if let Some(genre) = &tags.genre {
        tag.set_genre(genre.clone());
    }

    if let Some(cover) = cover {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::from_str(&cover.mime)),
            None,
            cover.data.clone(),
        ));
    }
}

/// Tag writer backed by lofty (ID3v2 for MP3 files).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write(&self, path: &Path, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<()> {
        debug!("Writing tags to: {}", path.display());

        let mut tagged_file = lofty::read_from_path(path)
            .map_err(|e| YmdlError::Tagging(format!("{}: {}", path.display(), e)))?;

        if tagged_file.primary_tag_mut().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .primary_tag_mut()
            .ok_or_else(|| YmdlError::Tagging(format!("{}: no tag", path.display())))?;

        apply_tags(tag, tags, cover);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| YmdlError::Tagging(format!("{}: {}", path.display(), e)))
    }
}
