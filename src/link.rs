//! Link classification.
//!
//! Yandex.Music links encode the entity as key/value path segments, e.g.
//! `/album/302127/track/3135556` or `/users/alice/playlists/1003`. A trailing
//! unpaired segment on artist links selects which artist page to read.

use std::collections::HashMap;

use url::Url;

use crate::error::{Result, YmdlError};

/// Required prefix of the link host (`music.yandex.ru`, `music.yandex.com`, ...).
pub const HOST_PREFIX: &str = "music.yandex";

/// Which list an artist link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtistView {
    #[default]
    Albums,
    Tracks,
    Similar,
}

impl ArtistView {
    /// Value of the `what` handler parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtistView::Albums => "albums",
            ArtistView::Tracks => "tracks",
            ArtistView::Similar => "similar",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "albums" => Some(ArtistView::Albums),
            "tracks" => Some(ArtistView::Tracks),
            "similar" => Some(ArtistView::Similar),
            _ => None,
        }
    }
}

/// What a link points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Track { id: String },
    Album { id: String },
    Artist { id: String, view: ArtistView },
    Playlist { owner: String, kind: String },
}

/// Classify a link into one of the four entity kinds.
pub fn classify(input: &str) -> Result<Link> {
    let invalid = || YmdlError::InvalidUrl(input.to_string());

    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    let known_host = url
        .host_str()
        .map(|h| h.starts_with(HOST_PREFIX))
        .unwrap_or(false);
    if !matches!(url.scheme(), "http" | "https") || !known_host {
        return Err(invalid());
    }

    let segments: Vec<String> = url
        .path()
        .trim_matches('/')
        .split('/')
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();

    let (pairs, view) = if segments.len() % 2 != 0 {
        let (last, rest) = segments.split_last().ok_or_else(invalid)?;
        (rest, ArtistView::parse(last).ok_or_else(invalid)?)
    } else {
        (&segments[..], ArtistView::default())
    };

    let info: HashMap<&str, &str> = pairs
        .chunks(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();

    if view == ArtistView::Similar {
        return match info.get("artist") {
            Some(id) => Ok(Link::Artist {
                id: id.to_string(),
                view,
            }),
            None => Err(invalid()),
        };
    }

    if let Some(id) = info.get("track") {
        Ok(Link::Track { id: id.to_string() })
    } else if let Some(id) = info.get("album") {
        Ok(Link::Album { id: id.to_string() })
    } else if let Some(id) = info.get("artist") {
        Ok(Link::Artist {
            id: id.to_string(),
            view,
        })
    } else if let Some(kind) = info.get("playlists") {
        let owner = info.get("users").ok_or_else(invalid)?;
        Ok(Link::Playlist {
            owner: owner.to_string(),
            kind: kind.to_string(),
        })
    } else {
        Err(invalid())
    }
}
