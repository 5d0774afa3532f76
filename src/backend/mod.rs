//! Media-server backend access
//!
//! The sync driver only needs two operations from a backend, captured by
//! [`ChannelBackend`]. [`TvheadendClient`] implements them over the
//! Tvheadend HTTP API.

use async_trait::async_trait;

pub mod api;
pub mod tvheadend;

pub use tvheadend::TvheadendClient;

use crate::errors::BackendResult;
use crate::models::Channel;

#[async_trait]
pub trait ChannelBackend: Send + Sync {
    /// Every channel the backend already knows, with raw backend fields in `extras`
    async fn list_channels(&self) -> BackendResult<Vec<Channel>>;

    /// Ask the backend to create a channel tuned on `interface`
    ///
    /// Success means the request was accepted, not that the stream is reachable.
    async fn create_channel(&self, channel: &Channel, interface: &str) -> BackendResult<()>;
}
