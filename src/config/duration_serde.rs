//! `#[serde(with = "duration_serde")]` for timeouts: `"30s"`, `"1m30s"`, or whole seconds.

use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*duration))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(seconds) => Ok(Duration::from_secs(seconds)),
        RawDuration::Text(text) => humantime::parse_duration(text.trim())
            .map_err(|e| de::Error::custom(format!("invalid duration '{text}': {e}"))),
    }
}
