//! Command history configuration.
//!
//! ```toml
//! # Keep at most 200 undo steps; omit for unlimited history.
//! max_depth = 200
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for a [`CommandStack`](crate::CommandStack).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
	/// Maximum number of retained commands. `None` keeps everything.
	///
	/// When exceeded, the oldest commands are dropped.
	pub max_depth: Option<usize>,
}

impl HistoryConfig {
	/// Unlimited history.
	pub fn unlimited() -> Self {
		Self::default()
	}

	/// History capped at `max_depth` commands.
	pub fn with_max_depth(max_depth: usize) -> Self {
		Self {
			max_depth: Some(max_depth),
		}
	}

	/// Parses a configuration from TOML text.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Toml`](crate::ConfigError::Toml) for malformed
	/// input or unknown keys.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}
}
