//! # ymdl
//!
//! A Rust library and command line tool for downloading tracks, albums,
//! artists and playlists from Yandex.Music.
//!
//! ## Quick Start
//!
//! The easiest way to use this library is through the [`Ymdl`] struct:
//!
//! ```rust,no_run
//! use ymdl::{DownloadConfig, Endpoints, Ymdl};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ymdl = Ymdl::new(DownloadConfig::with_output_dir("music"), Endpoints::default())?;
//!
//!     // Download an entire album
//!     let report = ymdl.download_url("https://music.yandex.ru/album/302127").await?;
//!     println!("Downloaded {} tracks", report.successful.len());
//!
//!     // Get metadata only
//!     let album = ymdl.api().get_album("302127").await?;
//!     println!("Album: {} ({} tracks)", album.display_title(), album.total_tracks());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Download tracks, albums, artists and playlists** from their web links
//! - **Resumable downloads**: interrupted files continue from a `.part` file
//! - **Naming templates** for track files and album directories
//! - **ID3 tags** with embedded cover art, plus folder covers and M3U playlists
//!
//! ## Low-Level APIs
//!
//! - [`MusicApi`] - metadata handlers and signed media links
//! - [`FileDownloader`] - resumable file transfer
//! - [`naming`] - template expansion and file name sanitizing

pub mod api;
pub mod config;
pub mod cover;
pub mod crypto;
pub mod download;
pub mod error;
pub mod link;
pub mod m3u;
pub mod models;
pub mod naming;
pub mod tagging;
pub mod utils;
mod ymdl;

#[cfg(test)]
mod test_helpers;

// Main interface (recommended)
pub use ymdl::{BatchReport, DownloadResult, Ymdl};

// Low-level APIs
pub use api::{MusicApi, SourceInfo};
pub use config::{DownloadConfig, Endpoints};
pub use cover::CoverArt;
pub use download::FileDownloader;
pub use error::{Result, YmdlError};
pub use link::{ArtistView, Link};
pub use models::{Album, Artist, Playlist, Track};
pub use tagging::{LoftyTagWriter, TagWriter, TrackTags};
