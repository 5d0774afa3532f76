//! Line classification for extended M3U playlists

use regex::Regex;
use std::sync::OnceLock;

/// Marker that opens an extended M3U playlist
pub const HEADER_MARKER: &str = "EXTM3U";

/// Channel name directive: `#EXTINF:<duration>,<name>`
pub const TAG_INF: &str = "INF";

/// Player option directive: `#EXTVLCOPT:<key>=<value>`
pub const TAG_VLCOPT: &str = "VLCOPT";

fn directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"^#EXT(?P<tag>\w+):(?P<value>.*)$").expect("directive pattern is valid")
    })
}

/// A trimmed, non-empty playlist line after the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistLine {
    /// `#EXT<TAG>:<value>`
    Directive { tag: String, value: String },
    /// Anything else terminates the current entry and is its stream address
    Address(String),
}

impl PlaylistLine {
    pub fn classify(line: &str) -> Self {
        match directive_regex().captures(line) {
            Some(caps) => Self::Directive {
                tag: caps["tag"].to_string(),
                value: caps["value"].to_string(),
            },
            None => Self::Address(line.to_string()),
        }
    }
}

/// Whether a line opens the playlist
pub fn is_header(line: &str) -> bool {
    line.contains(HEADER_MARKER)
}
