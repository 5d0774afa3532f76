use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder shown for channels whose playlist entry carried no `#EXTINF` name
pub const UNNAMED_CHANNEL: &str = "<unnamed>";

/// A single IPTV channel, either parsed from a playlist or listed by the backend
///
/// The stream `url` is the identity key: two channels with the same url are
/// the same channel for synchronization purposes, whatever their names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: Option<String>,
    pub url: String,
    /// Player options (`#EXTVLCOPT`) for playlist channels, raw grid fields for backend ones
    #[serde(default)]
    pub extras: HashMap<String, String>,
}

impl Channel {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: Some(name.into()),
            url: url.into(),
            extras: HashMap::new(),
        }
    }

    /// Name for progress output and logs
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_CHANNEL)
    }
}
