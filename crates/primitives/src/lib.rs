//! Core types for scene description editing: paths, values, time codes, and spec kinds.

/// Error types for parsing primitives.
pub mod error;
/// Hierarchical spec paths.
pub mod path;
/// Spec kinds.
pub mod spec_type;
/// Time codes for animated values.
pub mod time;
/// Field values.
pub mod value;

pub use error::{PathError, Result};
pub use path::SpecPath;
pub use spec_type::SpecType;
pub use time::TimeCode;
pub use value::{Dictionary, Value};

/// Field and child-list names.
///
/// Field names are plain interned-by-convention strings such as `typeName`
/// or `primChildren`.
pub type Token = String;

/// Well-known field names.
pub mod fields {
	/// Ordered prim child names of a prim spec.
	pub const PRIM_CHILDREN: &str = "primChildren";
	/// Ordered property names of a prim spec.
	pub const PROPERTY_CHILDREN: &str = "propertyChildren";
	/// Schema type name of a prim spec.
	pub const TYPE_NAME: &str = "typeName";
	/// Default (non time-sampled) value of an attribute spec.
	pub const DEFAULT: &str = "default";
	/// Free-form metadata dictionary.
	pub const CUSTOM_DATA: &str = "customData";
}
