//! Resumable file downloads.
//!
//! A file is first written to `<name>.part` next to its destination and only
//! renamed to the final name once the transfer completes, so the final path
//! never holds a truncated file. A leftover `.part` file from an interrupted
//! run is continued with an HTTP range request.

use std::path::{Path, PathBuf};

use bytes::BytesMut;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{Result, YmdlError};
use crate::utils::{get_available_space, size_to_str};

/// Bytes written to disk at a time.
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Width of the progress bar in characters.
pub const BAR_WIDTH: usize = 40;

/// Suffix of in-progress downloads.
pub const PART_EXTENSION: &str = ".part";

/// Path of the in-progress file for `destination`.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PART_EXTENSION);
    PathBuf::from(name)
}

/// Render one progress line: bar, percentage and sizes.
pub fn render_progress(written: u64, total: Option<u64>) -> String {
    match total {
        Some(total) => {
            let fraction = if total == 0 {
                1.0
            } else {
                (written as f64 / total as f64).min(1.0)
            };
            let hashes = (BAR_WIDTH as f64 * fraction).round() as usize;
            format!(
                "[{:<width$}] {:>5.1}% ({} / {})",
                "#".repeat(hashes),
                fraction * 100.0,
                size_to_str(written),
                size_to_str(total),
                width = BAR_WIDTH
            )
        }
        None => format!(
            "[{:<width$}] ({})",
            "",
            size_to_str(written),
            width = BAR_WIDTH
        ),
    }
}

/// Fail with a capacity error unless `dir` has `required` bytes free.
pub fn ensure_space(dir: &Path, required: u64) -> Result<()> {
    let available = get_available_space(dir)?;
    if available < required {
        return Err(YmdlError::Capacity {
            path: dir.to_path_buf(),
            required,
            available,
        });
    }
    Ok(())
}

/// Result of a completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Final file size in bytes.
    pub size: u64,
    /// Bytes transferred by this call.
    pub transferred: u64,
    /// Whether an earlier partial file was continued.
    pub resumed: bool,
}

/// Streams remote files to disk.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    client: Client,
    quiet: bool,
    check_disk_space: bool,
}

impl FileDownloader {
    pub fn new(client: Client, quiet: bool, check_disk_space: bool) -> Self {
        Self {
            client,
            quiet,
            check_disk_space,
        }
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total.unwrap_or(0));
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }
        bar
    }

    /// Download `url` to `destination`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if `destination` is present; nothing is requested.
    /// - `Capacity` if a fresh download does not fit on the volume.
    /// - `Remote` on network failure; the `.part` file is kept for a later resume.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
        if fs::try_exists(destination).await? {
            return Err(YmdlError::AlreadyExists(destination.to_path_buf()));
        }

        let part = part_path(destination);
        let existing = match fs::metadata(&part).await {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            _ => None,
        };

        let mut request = self.client.get(url);
        if let Some(size) = existing {
            debug!("Resuming {} from byte {}", part.display(), size);
            request = request.header(RANGE, format!("bytes={}-", size));
        }
        let response = request.send().await?;

        // The partial file already holds the whole object.
        if existing.is_some() && response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            let size = existing.unwrap_or(0);
            fs::rename(&part, destination)
                .await
                .map_err(|e| YmdlError::persistence(destination, e))?;
            return Ok(DownloadOutcome {
                size,
                transferred: 0,
                resumed: true,
            });
        }
        let response = response.error_for_status()?;

        let resumed = existing.is_some() && response.status() == StatusCode::PARTIAL_CONTENT;
        if existing.is_some() && !resumed {
            info!("Server ignored the range request, restarting {}", part.display());
        }
        let offset = if resumed { existing.unwrap_or(0) } else { 0 };
        let total = response.content_length().map(|len| offset + len);

        if let Some(dir) = destination.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| YmdlError::persistence(dir, e))?;
            if self.check_disk_space && !resumed {
                if let Some(required) = total {
                    ensure_space(dir, required)?;
                }
            }
        }

        let mut options = OpenOptions::new();
        if resumed {
            options.append(true);
        } else {
            options.write(true).create(true).truncate(true);
        }
        let mut file = options
            .open(&part)
            .await
            .map_err(|e| YmdlError::persistence(&part, e))?;

        let bar = self.progress_bar(total);
        let mut written = offset;
        let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);
        let mut stream = response.bytes_stream();

        loop {
            let chunk = match stream.next().await {
                Some(Ok(chunk)) => Some(chunk),
                Some(Err(e)) => {
                    // Keep what already arrived so the next run resumes after it.
                    let saved = async {
                        file.write_all(&buffer).await?;
                        file.flush().await
                    }
                    .await;
                    if let Err(err) = saved {
                        warn!("Can't save partial data to {}: {}", part.display(), err);
                    }
                    bar.abandon();
                    return Err(e.into());
                }
                None => None,
            };

            let finished = chunk.is_none();
            if let Some(chunk) = chunk {
                buffer.extend_from_slice(&chunk);
            }

            while buffer.len() >= CHUNK_SIZE || (finished && !buffer.is_empty()) {
                let take = buffer.len().min(CHUNK_SIZE);
                let block = buffer.split_to(take);
                file.write_all(&block)
                    .await
                    .map_err(|e| YmdlError::persistence(&part, e))?;
                written += block.len() as u64;
                bar.set_message(render_progress(written, total));
            }

            if finished {
                break;
            }
        }

        file.flush()
            .await
            .map_err(|e| YmdlError::persistence(&part, e))?;
        drop(file);
        bar.finish();

        fs::rename(&part, destination)
            .await
            .map_err(|e| YmdlError::persistence(destination, e))?;
        debug!("Saved {} ({} bytes)", destination.display(), written);

        Ok(DownloadOutcome {
            size: written,
            transferred: written - offset,
            resumed,
        })
    }
}
