use serde::{Deserialize, Serialize};

/// The kind of a spec in a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecType {
	/// The layer's root, addressed by `/`.
	PseudoRoot,
	Prim,
	Attribute,
	Relationship,
}

impl SpecType {
	/// Returns `true` for property spec kinds.
	pub fn is_property(self) -> bool {
		matches!(self, Self::Attribute | Self::Relationship)
	}
}
