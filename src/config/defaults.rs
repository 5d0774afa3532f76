//! Configuration default values
//!
//! Central place for every default used by the configuration layer.

use std::time::Duration;

// Backend defaults
pub const DEFAULT_INTERFACE: &str = "eth0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Environment variables: TVH_SYNC_BACKEND__USERNAME, TVH_SYNC_SYNC__DRY_RUN, ...
pub const ENV_PREFIX: &str = "TVH_SYNC_";
pub const ENV_SECTION_SEPARATOR: &str = "__";

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
