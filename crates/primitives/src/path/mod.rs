use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};


const ROOT: &str = "/";

/// An absolute path to a spec inside a layer.
///
/// Paths take one of three shapes:
/// - `/` for the pseudo-root,
/// - `/World/Mesh` for prims,
/// - `/World/Mesh.points` for properties.
///
/// The string form is validated on construction, so every `SpecPath` is
/// well formed. Paths order lexically, and because path elements are
/// identifiers (which sort after both `.` and `/`), a spec always sorts
/// before its descendants and the descendants of a spec are contiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpecPath(String);

impl SpecPath {
	/// Returns the pseudo-root path `/`.
	pub fn root() -> Self {
		Self(ROOT.to_string())
	}

	/// Parses and validates a path string.
	///
	/// # Errors
	///
	/// Returns a [`PathError`] if the string is empty, relative, or contains
	/// elements that are not identifiers.
	pub fn parse(input: &str) -> Result<Self> {
		if input.is_empty() {
			return Err(PathError::Empty);
		}
		if !input.starts_with('/') {
			return Err(PathError::NotAbsolute(input.to_string()));
		}
		if input == ROOT {
			return Ok(Self::root());
		}

		let (prim_part, property) = match input.rfind('.') {
			Some(dot) => (&input[..dot], Some(&input[dot + 1..])),
			None => (input, None),
		};

		if let Some(property) = property {
			if property.contains('/') {
				return Err(PathError::PropertyChild(input.to_string()));
			}
			if prim_part == ROOT {
				return Err(PathError::RootProperty);
			}
			check_name(property, input)?;
		}

		for name in prim_part[1..].split('/') {
			check_name(name, input)?;
		}

		Ok(Self(input.to_string()))
	}

	/// Returns the path as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns `true` for the pseudo-root path.
	pub fn is_root(&self) -> bool {
		self.0 == ROOT
	}

	/// Returns `true` if this path names a property.
	pub fn is_property(&self) -> bool {
		self.0.contains('.')
	}

	/// Returns the final path element, or an empty string for the pseudo-root.
	pub fn name(&self) -> &str {
		if self.is_root() {
			return "";
		}
		let start = self.0.rfind(['/', '.']).map_or(0, |idx| idx + 1);
		&self.0[start..]
	}

	/// Returns the parent path, or `None` for the pseudo-root.
	///
	/// The parent of a property is its owning prim.
	pub fn parent(&self) -> Option<SpecPath> {
		if self.is_root() {
			return None;
		}
		let sep = self.0.rfind(['/', '.'])?;
		if sep == 0 {
			return Some(Self::root());
		}
		Some(Self(self.0[..sep].to_string()))
	}

	/// Appends a prim child element.
	///
	/// # Errors
	///
	/// Fails if `name` is not an identifier or this path is a property.
	pub fn append_child(&self, name: &str) -> Result<SpecPath> {
		if self.is_property() {
			return Err(PathError::PropertyChild(format!("{}/{name}", self.0)));
		}
		let joined = if self.is_root() {
			format!("/{name}")
		} else {
			format!("{}/{name}", self.0)
		};
		check_name(name, &joined)?;
		Ok(Self(joined))
	}

	/// Appends a property element.
	///
	/// # Errors
	///
	/// Fails if `name` is not an identifier, this path is already a
	/// property, or this path is the pseudo-root.
	pub fn append_property(&self, name: &str) -> Result<SpecPath> {
		if self.is_root() {
			return Err(PathError::RootProperty);
		}
		let joined = format!("{}.{name}", self.0);
		if self.is_property() {
			return Err(PathError::PropertyChild(joined));
		}
		check_name(name, &joined)?;
		Ok(Self(joined))
	}

	/// Returns `true` if `prefix` is this path or one of its ancestors.
	pub fn has_prefix(&self, prefix: &SpecPath) -> bool {
		if prefix.is_root() || self == prefix {
			return true;
		}
		self.0
			.strip_prefix(prefix.as_str())
			.is_some_and(|rest| rest.starts_with(['/', '.']))
	}

	/// Rewrites the `old` prefix of this path to `new`.
	///
	/// Returns `None` if `old` is not a prefix of this path, or if the
	/// rewritten path would be malformed (a property under the pseudo-root or
	/// under another property).
	pub fn replace_prefix(&self, old: &SpecPath, new: &SpecPath) -> Option<SpecPath> {
		if !self.has_prefix(old) {
			return None;
		}
		if self == old {
			return Some(new.clone());
		}

		let rest = if old.is_root() {
			&self.0[..]
		} else {
			&self.0[old.0.len()..]
		};

		if new.is_root() {
			return rest.starts_with('/').then(|| Self(rest.to_string()));
		}
		if new.is_property() {
			return None;
		}
		Some(Self(format!("{}{rest}", new.0)))
	}
}

fn check_name(name: &str, path: &str) -> Result<()> {
	if is_identifier(name) {
		Ok(())
	} else {
		Err(PathError::InvalidName {
			name: name.to_string(),
			path: path.to_string(),
		})
	}
}

/// Returns `true` if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for SpecPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for SpecPath {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl TryFrom<String> for SpecPath {
	type Error = PathError;

	fn try_from(value: String) -> Result<Self> {
		Self::parse(&value)
	}
}

impl From<SpecPath> for String {
	fn from(path: SpecPath) -> Self {
		path.0
	}
}

impl AsRef<str> for SpecPath {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
