//! File and directory naming.
//!
//! Names are produced from templates containing the placeholders below.
//! Substitution is plain text replacement with no escaping, so a value that
//! itself contains a placeholder may be substituted again by a later token.

pub const FMT_TITLE: &str = "%t";
pub const FMT_ARTIST: &str = "%a";
pub const FMT_ALBUM: &str = "%A";
pub const FMT_TRACKN: &str = "%n";
pub const FMT_NTRACKS: &str = "%N";
pub const FMT_YEAR: &str = "%y";
pub const FMT_LABEL: &str = "%l";

/// Default track name for a single track.
pub const SINGLE_TRACK: &str = "%a - %t";
/// Default track name inside an album.
pub const ALBUM_TRACK: &str = "%n - %t";
/// Default track name inside a playlist.
pub const PLAYLIST_TRACK: &str = "%n - %a - %t";
/// Default track name in an artist's track list.
pub const ARTIST_TRACK: &str = "%t";

/// Default directory name for a single album.
pub const SINGLE_ALBUM_DIR: &str = "%a - %A (%y)";
/// Default directory name for an album of an artist.
pub const ARTIST_ALBUM_DIR: &str = "%y - %A";

/// Extension appended to track names.
pub const TRACK_EXTENSION: &str = ".mp3";

/// Placeholder reference shown in the command line help.
pub const HELP: &str = "\
Name formatting:
  %t - track title
  %a - artist
  %A - album
  %n - track number
  %N - total tracks in album (for track - in volume)
  %y - year
  %l - label
%t and %n will be ignored (deleted) in -a/--album_name.

Default track name format:
  Single track:      \"%a - %t\"
  Track in album:    \"%n - %t\"
  Playlist:          \"%n - %a - %t\"
  Artist's tracks:   \"%t\"

Default album directory name format:
  Single album:      \"%a - %A (%y)\"
  Artist's albums:   \"%y - %A\"
";

/// Substitution values for every placeholder.
///
/// Fields that do not apply stay empty, e.g. the track number of an album
/// directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameFields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track_number: String,
    pub track_count: String,
    pub year: String,
    pub label: String,
}

impl NameFields {
    fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            (FMT_TITLE, &self.title),
            (FMT_ARTIST, &self.artist),
            (FMT_ALBUM, &self.album),
            (FMT_TRACKN, &self.track_number),
            (FMT_NTRACKS, &self.track_count),
            (FMT_YEAR, &self.year),
            (FMT_LABEL, &self.label),
        ]
    }
}

/// Replace every placeholder in `template` with its field value.
pub fn expand(template: &str, fields: &NameFields) -> String {
    fields
        .pairs()
        .iter()
        .fold(template.to_string(), |acc, (token, value)| {
            acc.replace(*token, value)
        })
}

/// Make a name usable as a single path component on common file systems.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' | '/' => out.push('-'),
            '*' => out.push('_'),
            '<' | '>' | ':' | '|' | '?' => {}
            '"' => out.push_str("''"),
            c => out.push(c),
        }
    }
    out.trim_end_matches(['.', ' ']).to_string()
}

/// Zero-pad a track number to the width of the total, at least two digits.
pub fn pad_track_number(number: usize, total: usize) -> String {
    let width = total.to_string().len().max(2);
    format!("{:0width$}", number, width = width)
}

/// Expand and sanitize a track name, adding the `.mp3` extension if missing.
pub fn track_file_name(template: &str, fields: &NameFields) -> String {
    let mut name = sanitize(&expand(template, fields));
    if !name.to_lowercase().ends_with(TRACK_EXTENSION) {
        name.push_str(TRACK_EXTENSION);
    }
    name
}

/// Expand and sanitize a directory name.
pub fn dir_name(template: &str, fields: &NameFields) -> String {
    sanitize(&expand(template, fields))
}

/// Name of the `n`-th volume folder out of `total`.
pub fn volume_dir_name(prefix: &str, number: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{}{:0width$}", sanitize(prefix), number, width = width)
}
