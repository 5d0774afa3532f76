use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::ChannelBackend;
use super::api::*;
use crate::config::BackendConfig;
use crate::errors::{AppError, AppResult, BackendError, BackendResult};
use crate::models::Channel;
use crate::utils::UrlUtils;

/// Longest slice of an unexpected response body quoted in an error
const BODY_SNIPPET_LEN: usize = 120;

#[derive(Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// Client for the Tvheadend management API
///
/// Every request is a form-encoded `POST` against the configured base URL,
/// carries the configured basic-auth credentials (if any), and is bounded by
/// the configured timeout.
pub struct TvheadendClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl TvheadendClient {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let raw_url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("Tvheadend URL is required"))?;
        let base_url = UrlUtils::parse_base(raw_url).map_err(|e| {
            AppError::configuration(format!(
                "invalid Tvheadend URL '{}': {e}",
                UrlUtils::obfuscate_credentials(raw_url)
            ))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::configuration(format!("failed to create HTTP client: {e}")))?;

        let credentials = config.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: config.password.clone(),
        });

        debug!(
            "Tvheadend client for {} (auth: {}, timeout: {:?})",
            UrlUtils::obfuscate_credentials(base_url.as_str()),
            credentials.is_some(),
            config.timeout
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Opaque id of the first configured network muxes can be attached to
    pub async fn find_network_uuid(&self) -> BackendResult<String> {
        let response: IdnodeLoadResponse = self
            .post_form(
                IDNODE_LOAD_PATH,
                &IdnodeLoadRequest {
                    class: NETWORK_CLASS,
                    enumerate: 1,
                    query: "",
                },
            )
            .await?;

        let network = response
            .entries
            .into_iter()
            .next()
            .ok_or(BackendError::NoNetworkConfigured)?;
        debug!("Using network {}", network.key);
        Ok(network.key)
    }

    async fn post_form<B, T>(&self, path: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = UrlUtils::join(&self.base_url, path).map_err(|e| {
            BackendError::protocol(
                UrlUtils::obfuscate_credentials(self.base_url.as_str()),
                format!("cannot build endpoint '{path}': {e}"),
            )
        })?;
        let display_url = UrlUtils::obfuscate_credentials(url.as_str());

        let mut request = self.client.post(url).form(body);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_deref());
        }

        debug!("POST {}", display_url);
        let response = request.send().await.map_err(|e| BackendError::Unreachable {
            url: display_url.clone(),
            message: UrlUtils::obfuscate_credentials(&e.to_string()),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::AuthenticationFailed {
                url: display_url,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(BackendError::protocol(
                display_url,
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let text = response.text().await.map_err(|e| BackendError::Unreachable {
            url: display_url.clone(),
            message: UrlUtils::obfuscate_credentials(&e.to_string()),
        })?;

        serde_json::from_str(&text).map_err(|e| {
            BackendError::protocol(
                display_url,
                format!("unexpected response body ({e}): {:?}", snippet(&text)),
            )
        })
    }
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[async_trait]
impl ChannelBackend for TvheadendClient {
    async fn list_channels(&self) -> BackendResult<Vec<Channel>> {
        let grid: MuxGridResponse = self
            .post_form(MUX_GRID_PATH, &MuxGridRequest::default())
            .await?;
        let total = grid.entries.len();
        let channels: Vec<Channel> = grid.into_channels().collect();
        info!(
            "Tvheadend knows {} mux(es), {} with an IPTV url",
            total,
            channels.len()
        );
        Ok(channels)
    }

    async fn create_channel(&self, channel: &Channel, interface: &str) -> BackendResult<()> {
        let network_uuid = self.find_network_uuid().await?;

        let conf = serde_json::to_string(&IptvMuxConf::for_channel(channel, interface))
            .map_err(|e| {
                BackendError::protocol(
                    UrlUtils::obfuscate_credentials(self.base_url.as_str()),
                    format!("cannot encode mux configuration: {e}"),
                )
            })?;

        let _ack: serde_json::Value = self
            .post_form(
                MUX_CREATE_PATH,
                &MuxCreateRequest {
                    uuid: &network_uuid,
                    conf,
                },
            )
            .await?;

        info!(
            "Created mux '{}' for {} on network {}",
            channel.display_name(),
            channel.url,
            network_uuid
        );
        Ok(())
    }
}
