//! Error types for primitive parsing.

use thiserror::Error;

/// Errors that can occur when parsing a [`SpecPath`](crate::SpecPath).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// The input string was empty.
	#[error("empty path")]
	Empty,

	/// Paths must start at the pseudo-root.
	#[error("path is not absolute: {0}")]
	NotAbsolute(String),

	/// A path element is not a valid identifier.
	#[error("invalid name {name:?} in path {path}")]
	InvalidName {
		/// The offending element.
		name: String,
		/// The full input.
		path: String,
	},

	/// A property path cannot have further elements.
	#[error("property path cannot have children: {0}")]
	PropertyChild(String),

	/// The pseudo-root cannot own properties.
	#[error("pseudo-root cannot have properties")]
	RootProperty,
}

/// Result type for primitive parsing.
pub type Result<T> = std::result::Result<T, PathError>;
