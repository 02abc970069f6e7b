//! Artist-related models.

use serde::{Deserialize, Serialize};

use super::common::Id;

/// Short artist description returned under the `artist` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistSummary {
    pub name: String,
}

/// What an artist page lists: either loose tracks or albums, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArtistCatalog {
    /// The artist's tracks, downloaded as one flat set.
    Tracks {
        #[serde(rename = "trackIds")]
        track_ids: Vec<Id>,
    },
    /// The artist's main albums and the albums they merely appear on.
    Albums {
        #[serde(rename = "albumIds")]
        album_ids: Vec<Id>,
        #[serde(rename = "alsoAlbumIds", default)]
        also_album_ids: Vec<Id>,
    },
}

/// A full artist page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    #[serde(rename = "artist")]
    pub summary: ArtistSummary,

    #[serde(flatten)]
    pub catalog: ArtistCatalog,
}

impl Artist {
    pub fn name(&self) -> &str {
        &self.summary.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artist_tracks() {
        let artist: Artist = serde_json::from_value(json!({
            "artist": {"name": "Band"},
            "trackIds": [1, "2"]
        }))
        .unwrap();
        assert_eq!(artist.name(), "Band");
        assert_eq!(
            artist.catalog,
            ArtistCatalog::Tracks {
                track_ids: vec![Id::from("1"), Id::from("2")]
            }
        );
    }

    #[test]
    fn test_artist_albums() {
        let artist: Artist = serde_json::from_value(json!({
            "artist": {"name": "Band"},
            "albumIds": [10, 11],
            "alsoAlbumIds": [12]
        }))
        .unwrap();
        match artist.catalog {
            ArtistCatalog::Albums {
                album_ids,
                also_album_ids,
            } => {
                assert_eq!(album_ids.len(), 2);
                assert_eq!(also_album_ids, vec![Id::from("12")]);
            }
            other => panic!("unexpected catalog: {:?}", other),
        }
    }

    #[test]
    fn test_artist_without_catalog_fails() {
        let result = serde_json::from_value::<Artist>(json!({"artist": {"name": "Band"}}));
        assert!(result.is_err());
    }
}
