//! Error types for namespace editing helpers.

use thiserror::Error;
use tweak_primitives::{PathError, SpecPath};

/// Errors reported by the [`Layer`](crate::Layer) namespace helpers.
///
/// Primitive mutations never fail; they are no-ops on missing targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
	/// The path could not be built.
	#[error(transparent)]
	Path(#[from] PathError),

	/// The spec the edit targets does not exist.
	#[error("no spec at {0}")]
	MissingSpec(SpecPath),

	/// A spec already exists where the edit would create one.
	#[error("spec already exists at {0}")]
	SpecExists(SpecPath),
}

/// Result type for layer namespace edits.
pub type Result<T> = std::result::Result<T, LayerError>;
