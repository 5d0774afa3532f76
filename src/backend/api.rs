//! Tvheadend API endpoints and wire types
//!
//! Requests are form-encoded; responses are JSON objects with an `entries` list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::models::Channel;

pub const IDNODE_LOAD_PATH: &str = "api/idnode/load";
pub const MUX_CREATE_PATH: &str = "api/mpegts/network/mux_create";
pub const MUX_GRID_PATH: &str = "api/mpegts/mux/grid";

/// idnode class of the networks muxes are attached to
pub const NETWORK_CLASS: &str = "mpegts_network";
pub const MUX_CHARSET: &str = "AUTO";
/// Page size large enough to fetch every mux in one grid request
pub const GRID_LIMIT: u64 = 999_999_999;

/// `POST api/idnode/load`
#[derive(Debug, Serialize)]
pub struct IdnodeLoadRequest<'a> {
    pub class: &'a str,
    #[serde(rename = "enum")]
    pub enumerate: u8,
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct IdnodeLoadResponse {
    pub entries: Vec<IdnodeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IdnodeEntry {
    pub key: String,
}

/// `POST api/mpegts/network/mux_create`; `conf` is a JSON-encoded [`IptvMuxConf`]
#[derive(Debug, Serialize)]
pub struct MuxCreateRequest<'a> {
    pub uuid: &'a str,
    pub conf: String,
}

#[derive(Debug, Serialize)]
pub struct IptvMuxConf<'a> {
    pub enabled: u8,
    pub skipinitscan: u8,
    pub iptv_muxname: &'a str,
    pub iptv_sname: &'a str,
    pub iptv_url: &'a str,
    pub iptv_interface: &'a str,
    pub charset: &'a str,
}

impl<'a> IptvMuxConf<'a> {
    /// Enabled mux that skips the initial scan; the name doubles as service name
    pub fn for_channel(channel: &'a Channel, interface: &'a str) -> Self {
        let name = channel.name.as_deref().unwrap_or_default();
        Self {
            enabled: 1,
            skipinitscan: 1,
            iptv_muxname: name,
            iptv_sname: name,
            iptv_url: &channel.url,
            iptv_interface: interface,
            charset: MUX_CHARSET,
        }
    }
}

/// `POST api/mpegts/mux/grid`
#[derive(Debug, Serialize)]
pub struct MuxGridRequest<'a> {
    pub start: u64,
    pub limit: u64,
    pub sort: &'a str,
    pub dir: &'a str,
}

impl Default for MuxGridRequest<'_> {
    fn default() -> Self {
        Self {
            start: 0,
            limit: GRID_LIMIT,
            sort: "name",
            dir: "ASC",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MuxGridResponse {
    pub entries: Vec<Map<String, Value>>,
}

impl MuxGridResponse {
    /// Channels for every IPTV mux; muxes without `iptv_url` are not IPTV and are left out
    pub fn into_channels(self) -> impl Iterator<Item = Channel> {
        self.entries.into_iter().filter_map(mux_to_channel)
    }
}

fn mux_to_channel(entry: Map<String, Value>) -> Option<Channel> {
    let url = match entry.get("iptv_url") {
        Some(Value::String(url)) if !url.is_empty() => url.clone(),
        _ => {
            debug!(
                "Ignoring mux without iptv_url: {}",
                entry.get("uuid").map(value_to_string).unwrap_or_default()
            );
            return None;
        }
    };

    let name = match entry.get("name") {
        Some(Value::String(name)) => Some(name.clone()),
        _ => None,
    };

    let extras: HashMap<String, String> = entry
        .iter()
        .map(|(key, value)| (key.clone(), value_to_string(value)))
        .collect();

    Some(Channel { name, url, extras })
}

/// Strings verbatim, everything else in its JSON text form
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
