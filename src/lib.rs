//! Bulk-add IPTV multicast channels from an extended M3U playlist to Tvheadend.
//!
//! [`playlist::PlaylistParser`] turns the playlist into a lazy stream of
//! [`models::Channel`]s. [`sync::SyncDriver`] walks that stream and adds every
//! channel whose url the backend does not know yet, talking to Tvheadend
//! through [`backend::TvheadendClient`].

pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod playlist;
pub mod sync;
pub mod utils;
