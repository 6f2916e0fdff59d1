//! Error types for history configuration.
//!
//! Engine operations (recording, undo, redo) never fail; degenerate cases are
//! no-ops. Only configuration parsing reports errors.

use thiserror::Error;

/// Errors that can occur when loading a [`HistoryConfig`](crate::HistoryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML text could not be parsed into a configuration.
	#[error("invalid history config: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
