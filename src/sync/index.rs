use std::collections::HashMap;

use tracing::debug;

use crate::models::Channel;

/// Channels known for this run, keyed by stream url
///
/// Built from the backend listing and extended with every channel added
/// during the run, so a url repeated later in the playlist is skipped.
#[derive(Debug, Default)]
pub struct KnownChannelIndex {
    by_url: HashMap<String, Channel>,
}

impl KnownChannelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index channels in order; for a repeated url the last one wins
    pub fn from_channels<I: IntoIterator<Item = Channel>>(channels: I) -> Self {
        let mut index = Self::new();
        for channel in channels {
            if let Some(previous) = index.insert(channel) {
                debug!("Backend lists {} more than once", previous.url);
            }
        }
        index
    }

    pub fn get(&self, url: &str) -> Option<&Channel> {
        self.by_url.get(url)
    }

    /// Returns the channel previously stored under the same url
    pub fn insert(&mut self, channel: Channel) -> Option<Channel> {
        self.by_url.insert(channel.url.clone(), channel)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}
