use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use crate::playlist::MalformedPolicy;
use crate::sync::ChannelErrorPolicy;
use crate::utils::UrlUtils;
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Connection settings for the Tvheadend API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://192.168.1.2:9981`
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Network interface Tvheadend tunes multicast streams on
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Per-request timeout
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub malformed: MalformedPolicy,
    #[serde(default)]
    pub on_error: ChannelErrorPolicy,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            interface: default_interface(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    /// Load defaults, then the optional TOML file, then `TVH_SYNC_*` environment variables
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(AppError::configuration(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SECTION_SEPARATOR))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))
    }

    /// Check the settings needed for a sync run
    pub fn validate(&self) -> AppResult<()> {
        let url = self
            .backend
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("Tvheadend URL is required"))?;

        UrlUtils::parse_base(url).map_err(|e| {
            AppError::configuration(format!(
                "invalid Tvheadend URL '{}': {e}",
                UrlUtils::obfuscate_credentials(url)
            ))
        })?;

        if self.backend.password.is_some() && self.backend.username.is_none() {
            return Err(AppError::configuration(
                "a password was given without a user name",
            ));
        }

        if self.backend.interface.trim().is_empty() {
            return Err(AppError::configuration("interface name must not be empty"));
        }

        if self.backend.timeout.is_zero() {
            return Err(AppError::configuration("request timeout must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn with_url(url: &str) -> Config {
        let mut config = Config::default();
        config.backend.url = Some(url.to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.interface, "eth0");
        assert_eq!(config.backend.timeout, Duration::from_secs(30));
        assert_eq!(config.sync.malformed, MalformedPolicy::Abort);
        assert_eq!(config.sync.on_error, ChannelErrorPolicy::FailFast);
        assert!(!config.sync.dry_run);
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tvh-m3u-sync.toml",
                r#"
[backend]
url = "http://tvh.lan:9981"
username = "admin"
password = "secret"
interface = "eth1"
timeout = "10s"

[sync]
malformed = "skip_entry"
on_error = "continue"
"#,
            )?;

            let config = Config::load(Some(Path::new("tvh-m3u-sync.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.backend.url.as_deref(), Some("http://tvh.lan:9981"));
            assert_eq!(config.backend.username.as_deref(), Some("admin"));
            assert_eq!(config.backend.interface, "eth1");
            assert_eq!(config.backend.timeout, Duration::from_secs(10));
            assert_eq!(config.sync.malformed, MalformedPolicy::SkipEntry);
            assert_eq!(config.sync.on_error, ChannelErrorPolicy::Continue);
            config.validate().map_err(|e| e.to_string())?;
            Ok(())
        });
    }

    #[test]
    fn test_environment_layer() {
        Jail::expect_with(|jail| {
            jail.set_env("TVH_SYNC_BACKEND__URL", "http://env.lan:9981");
            jail.set_env("TVH_SYNC_BACKEND__TIMEOUT", "10");
            jail.set_env("TVH_SYNC_SYNC__ON_ERROR", "continue");

            let config = Config::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.url.as_deref(), Some("http://env.lan:9981"));
            assert_eq!(config.backend.timeout, Duration::from_secs(10));
            assert_eq!(config.sync.on_error, ChannelErrorPolicy::Continue);
            assert_eq!(config.backend.interface, DEFAULT_INTERFACE);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tvh-m3u-sync.toml",
                r#"
[backend]
url = "http://file.lan:9981"
interface = "eth1"
timeout = "45s"
"#,
            )?;
            jail.set_env("TVH_SYNC_BACKEND__TIMEOUT", "5s");

            let config = Config::load(Some(Path::new("tvh-m3u-sync.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.backend.url.as_deref(), Some("http://file.lan:9981"));
            assert_eq!(config.backend.interface, "eth1");
            assert_eq!(config.backend.timeout, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/tvh-m3u-sync.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_err());
        assert!(with_url("http://192.168.1.2:9981").validate().is_ok());
        assert!(with_url("192.168.1.2:9981").validate().is_ok());
        assert!(with_url("http://").validate().is_err());

        let mut config = with_url("http://tvh.lan");
        config.backend.password = Some("secret".to_string());
        assert!(config.validate().is_err());
        config.backend.username = Some("admin".to_string());
        assert!(config.validate().is_ok());

        config.backend.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
