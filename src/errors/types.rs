//! Error type definitions for tvh-m3u-sync
//!
//! Errors are split by the layer that produces them: playlist parsing,
//! backend API calls, and the application boundary that ties them together.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist parsing errors
    #[error("Playlist error: {0}")]
    Parse(#[from] ParseError),

    /// Backend API errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Errors raised while reading and interpreting a playlist
#[derive(Error, Debug)]
pub enum ParseError {
    /// The playlist could not be opened or read
    #[error("Cannot read playlist '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directive line does not have the shape its tag requires
    #[error("Malformed #EXT{tag} directive at line {line_number}: {message} ({line:?})")]
    MalformedDirective {
        line_number: usize,
        tag: String,
        line: String,
        message: String,
    },
}

/// Errors raised by the Tvheadend API client
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport-level failure, timeouts included
    #[error("Tvheadend unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// The backend rejected the credentials
    #[error("Authentication failed at {url}: HTTP {status}")]
    AuthenticationFailed { url: String, status: u16 },

    /// Unexpected status code or response shape
    #[error("Unexpected response from {url}: {message}")]
    Protocol { url: String, message: String },

    /// The idnode query returned no network to attach muxes to
    #[error(
        "No network configured in Tvheadend. Create an IPTV network first and keep its \
         maximum number of input streams low: Tvheadend subscribes to every mux that gets \
         added, and a high limit can make the server stop responding."
    )]
    NoNetworkConfigured,
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Process exit code for this error: 1 for input problems, 2 for backend problems
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Parse(_) | Self::Configuration { .. } => 1,
            Self::Backend(_) => 2,
        }
    }
}

impl ParseError {
    pub fn source_unavailable<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

impl BackendError {
    /// Create a protocol error for the given endpoint
    pub fn protocol<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Protocol {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether a per-channel failure should stop the whole run regardless of policy
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::NoNetworkConfigured | Self::AuthenticationFailed { .. }
        )
    }
}
