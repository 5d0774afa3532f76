//! One reconciliation pass between a playlist and the backend
//!
//! The driver indexes what the backend already knows by stream url, then
//! walks the playlist in order: known urls are skipped, unknown ones are
//! created. Every decision is reported to a [`SyncObserver`] as it is made,
//! so a run that fails halfway still leaves a readable log of what was applied.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod index;
pub mod observer;

pub use index::KnownChannelIndex;
pub use observer::{ConsoleObserver, SyncDecision, SyncObserver};

use crate::backend::ChannelBackend;
use crate::errors::{AppResult, ParseResult};
use crate::models::Channel;

/// What to do when creating one channel fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelErrorPolicy {
    /// Abort the run on the first failure
    #[default]
    FailFast,
    /// Report the failure and continue with the next channel
    ///
    /// Missing network and rejected credentials still abort: every later
    /// channel would fail the same way.
    Continue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct SyncDriver<'a, B: ChannelBackend + ?Sized> {
    backend: &'a B,
    interface: String,
    on_error: ChannelErrorPolicy,
    dry_run: bool,
}

impl<'a, B: ChannelBackend + ?Sized> SyncDriver<'a, B> {
    pub fn new<S: Into<String>>(backend: &'a B, interface: S) -> Self {
        Self {
            backend,
            interface: interface.into(),
            on_error: ChannelErrorPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_error_policy(mut self, policy: ChannelErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Report what would be added without calling the backend's create operation
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Index every channel the backend currently knows by url
    pub async fn build_index(&self) -> AppResult<KnownChannelIndex> {
        let index = KnownChannelIndex::from_channels(self.backend.list_channels().await?);
        info!("Indexed {} known channel url(s)", index.len());
        Ok(index)
    }

    /// Run one pass over `channels`, pulling them one at a time
    pub async fn run<I, O>(&self, channels: I, observer: &mut O) -> AppResult<SyncSummary>
    where
        I: IntoIterator<Item = ParseResult<Channel>>,
        O: SyncObserver + ?Sized,
    {
        let mut index = self.build_index().await?;
        let mut summary = SyncSummary::default();

        for channel in channels {
            let channel = channel?;

            if let Some(known) = index.get(&channel.url) {
                debug!("Already known as '{}': {}", known.display_name(), channel.url);
                observer.on_decision(&SyncDecision::Skipped(&channel));
                summary.skipped += 1;
                continue;
            }

            if self.dry_run {
                observer.on_decision(&SyncDecision::WouldAdd(&channel));
                summary.added += 1;
                index.insert(channel);
                continue;
            }

            match self.backend.create_channel(&channel, &self.interface).await {
                Ok(()) => {
                    observer.on_decision(&SyncDecision::Added(&channel));
                    summary.added += 1;
                    index.insert(channel);
                }
                Err(e) if self.on_error == ChannelErrorPolicy::Continue && !e.is_fatal_for_run() => {
                    warn!("Failed to add {}: {}", channel.url, e);
                    observer.on_decision(&SyncDecision::Failed(&channel, &e));
                    summary.failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Sync finished: {} added, {} skipped, {} failed",
            summary.added, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}
