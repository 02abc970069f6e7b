//! Shared fixtures for tests talking to a mock server.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Endpoints;
use crate::cover::CoverArt;
use crate::error::Result;
use crate::tagging::{TagWriter, TrackTags};

/// Endpoints pointing every handler, storage host and cover at `server`.
pub(crate) fn endpoints_for(server: &MockServer) -> Endpoints {
    let mut endpoints = Endpoints::with_base(&server.uri(), &server.uri());
    endpoints.media = "http://{host}/get-mp3/{md5}/{ts}/{path}".to_string();
    endpoints.cover = "http://{uri}".to_string();
    endpoints
}

/// Storage directory of the fixture track `id`.
pub(crate) fn storage_dir(id: u64) -> String {
    format!("43715_2d5b8aec.{}", id)
}

/// Minimal track handler record.
pub(crate) fn track_json(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "durationMs": 180_000 + id,
        "storageDir": storage_dir(id),
        "artists": [{"name": "Band", "composer": false}],
        "albums": [{
            "id": 900,
            "title": "Album",
            "year": 2001,
            "genre": "rock",
            "labels": [{"name": "Label"}],
            "artists": [{"name": "Band"}]
        }]
    })
}

/// Album handler record with one volume per entry of `volumes`, holding
/// that many tracks. Track ids are numbered from `first_track_id`.
pub(crate) fn album_json(id: u64, title: &str, volumes: &[usize], first_track_id: u64) -> Value {
    let mut next = first_track_id;
    let volumes: Vec<Vec<Value>> = volumes
        .iter()
        .map(|&count| {
            (0..count)
                .map(|_| {
                    let track = track_json(next, &format!("Track {}", next));
                    next += 1;
                    track
                })
                .collect()
        })
        .collect();

    json!({
        "id": id,
        "title": title,
        "year": 2001,
        "genre": "rock",
        "labels": [{"name": "Label"}],
        "artists": [{"name": "Band"}],
        "trackCount": volumes.iter().map(Vec::len).sum::<usize>(),
        "volumes": volumes
    })
}

/// Audio bytes served for track `id`.
pub(crate) fn media_body(id: u64) -> Vec<u8> {
    format!("ID3 fake audio of track {}", id).into_bytes()
}

/// Mount the storage lookup and the media file of track `id`.
pub(crate) async fn mount_media(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/download-info/{}/2", storage_dir(id))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "host": server.address().to_string(),
            "path": format!("/media/{}.mp3", id),
            "ts": "0005a1b2",
            "s": "salt"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(format!(
            r"^/get-mp3/[0-9a-f]{{32}}/0005a1b2/media/{}\.mp3$",
            id
        )))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(media_body(id)))
        .mount(server)
        .await;
}

/// Tag writer remembering what it was asked to write.
#[derive(Debug, Default)]
pub(crate) struct RecordingTagger {
    pub(crate) written: Mutex<Vec<(PathBuf, TrackTags, bool)>>,
}

impl RecordingTagger {
    /// Recorded tags, ordered by file path.
    pub(crate) fn sorted(&self) -> Vec<(PathBuf, TrackTags, bool)> {
        let mut all = self.written.lock().unwrap().clone();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

impl TagWriter for RecordingTagger {
    fn write(&self, path: &Path, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<()> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), tags.clone(), cover.is_some()));
        Ok(())
    }
}
