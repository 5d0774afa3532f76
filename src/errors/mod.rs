//! Centralized error handling for tvh-m3u-sync
//!
//! # Error Categories
//!
//! - **Parse Errors**: the playlist is unreadable or a directive is malformed
//! - **Backend Errors**: Tvheadend cannot be reached or answers with an error
//! - **Configuration Errors**: invalid settings after all layers are merged

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for playlist parsing Results
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience type alias for backend Results
pub type BackendResult<T> = Result<T, BackendError>;
