//! Metadata handler client.
//!
//! Every call substitutes its parameters into one of the endpoint templates,
//! issues a GET with a bounded timeout and decodes the JSON body. Transport
//! failures and unparsable bodies are remote errors; a body lacking an
//! expected key is a schema error.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{fill, Endpoints};
use crate::error::{Result, YmdlError};
use crate::link::ArtistView;
use crate::models::{self, Album, Artist, ArtistSummary, Playlist, Track};

/// Browser user agent sent with every request.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Yandex.Music metadata client.
///
/// # Example
///
/// ```rust,no_run
/// use ymdl::{Endpoints, MusicApi};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = MusicApi::new(Endpoints::default())?;
///     let track = api.get_track("3135556").await?;
///     println!("Track: {}", track.display_title());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MusicApi {
    client: Client,
    endpoints: Endpoints,
}

impl MusicApi {
    /// Create a client for the given endpoints.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, endpoints))
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Underlying HTTP client, shared with file downloads.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET a handler and parse its body as JSON.
    pub(crate) async fn get_json(&self, template: &str, params: &[(&str, &str)]) -> Result<Value> {
        let encoded: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| (*k, urlencoding::encode(v).into_owned()))
            .collect();
        let encoded: Vec<(&str, &str)> = encoded.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let url = fill(template, &encoded);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.endpoints.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|source| YmdlError::MalformedResponse { url, source })
    }

    /// Raw track handler response.
    pub async fn get_track_json(&self, track_id: &str) -> Result<Value> {
        self.get_json(&self.endpoints.track, &[("track", track_id)])
            .await
    }

    /// Get a track by ID.
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        let json = self.get_track_json(track_id).await?;
        models::decode(models::take_field(json, "track")?, "track")
    }

    /// Get an album by ID, including its volumes.
    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        let json = self
            .get_json(&self.endpoints.album, &[("album", album_id)])
            .await?;
        models::decode(json, "album")
    }

    /// Get an artist page.
    pub async fn get_artist(&self, artist_id: &str, view: ArtistView) -> Result<Artist> {
        let json = self.get_artist_json(artist_id, view).await?;
        models::decode(json, "artist")
    }

    /// Get only the artist name, whatever the page lists.
    pub async fn get_artist_name(&self, artist_id: &str, view: ArtistView) -> Result<String> {
        #[derive(Deserialize)]
        struct Page {
            artist: ArtistSummary,
        }

        let json = self.get_artist_json(artist_id, view).await?;
        let page: Page = models::decode(json, "artist")?;
        Ok(page.artist.name)
    }

    async fn get_artist_json(&self, artist_id: &str, view: ArtistView) -> Result<Value> {
        self.get_json(
            &self.endpoints.artist,
            &[("artist", artist_id), ("what", view.as_str())],
        )
        .await
    }

    /// Get a user playlist.
    pub async fn get_playlist(&self, owner: &str, kind: &str) -> Result<Playlist> {
        let json = self
            .get_json(
                &self.endpoints.playlist,
                &[("users", owner), ("playlists", kind)],
            )
            .await?;
        models::decode(models::take_field(json, "playlist")?, "playlist")
    }
}
