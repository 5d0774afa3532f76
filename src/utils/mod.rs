//! Utility modules for tvh-m3u-sync

pub mod url;

pub use url::UrlUtils;
