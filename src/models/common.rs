//! Common types shared across all models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a track, album or artist.
///
/// The service sends identifiers either as JSON numbers or as strings,
/// so both are accepted and kept in their textual form.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Id(s),
            Raw::Number(n) => Id(n.to_string()),
        })
    }
}

/// Artist as it appears inside a track or album.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    /// Artist name.
    pub name: String,

    /// Whether the artist is credited as a composer rather than a performer.
    #[serde(default)]
    pub composer: bool,
}

impl ArtistRef {
    pub fn new<S: Into<String>>(name: S, composer: bool) -> Self {
        Self {
            name: name.into(),
            composer,
        }
    }
}

/// Record label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
}

/// Split credited artists into a display string and a composer string.
///
/// Composers are shown as the artist only when nobody else is credited.
pub fn split_artists(all: &[ArtistRef]) -> (String, String) {
    let (composers, performers): (Vec<&ArtistRef>, Vec<&ArtistRef>) =
        all.iter().partition(|a| a.composer);

    let join = |list: &[&ArtistRef]| {
        list.iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let composers = join(&composers);
    let performers = join(&performers);
    if performers.is_empty() {
        (composers.clone(), composers)
    } else {
        (performers, composers)
    }
}

/// Append a version suffix to a title: `Title (Version)`.
pub fn decorate_title(title: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() => format!("{} ({})", title, v),
        _ => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_number_and_string() {
        let a: Id = serde_json::from_str("3135556").unwrap();
        let b: Id = serde_json::from_str("\"3135556\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "3135556");
    }

    #[test]
    fn test_split_artists() {
        let artists = vec![
            ArtistRef::new("Orchestra", false),
            ArtistRef::new("Mozart", true),
            ArtistRef::new("Soloist", false),
        ];
        let (shown, composers) = split_artists(&artists);
        assert_eq!(shown, "Orchestra, Soloist");
        assert_eq!(composers, "Mozart");
    }

    #[test]
    fn test_split_artists_composers_only() {
        let artists = vec![ArtistRef::new("Bach", true), ArtistRef::new("Handel", true)];
        let (shown, composers) = split_artists(&artists);
        assert_eq!(shown, "Bach, Handel");
        assert_eq!(composers, "Bach, Handel");
    }

    #[test]
    fn test_decorate_title() {
        assert_eq!(decorate_title("Song", Some("Live")), "Song (Live)");
        assert_eq!(decorate_title("Song", None), "Song");
        assert_eq!(decorate_title("Song", Some("")), "Song");
    }
}
