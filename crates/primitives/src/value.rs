//! Field values stored on specs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::SpecPath;

/// A string-keyed, ordered dictionary of values.
pub type Dictionary = BTreeMap<String, Value>;

/// Separator between nested keys in a dictionary key path.
pub const KEY_PATH_SEPARATOR: char = ':';

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
	/// An identifier-like string, used for child names and type names.
	Token(String),
	Path(SpecPath),
	Array(Vec<Value>),
	Dictionary(Dictionary),
}

impl Value {
	/// Creates a [`Value::Token`].
	pub fn token(name: impl Into<String>) -> Self {
		Self::Token(name.into())
	}

	/// Returns the token text if this is a [`Value::Token`].
	pub fn as_token(&self) -> Option<&str> {
		match self {
			Self::Token(t) => Some(t),
			_ => None,
		}
	}

	/// Returns the elements if this is a [`Value::Array`].
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Returns the dictionary if this is a [`Value::Dictionary`].
	pub fn as_dictionary(&self) -> Option<&Dictionary> {
		match self {
			Self::Dictionary(dict) => Some(dict),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Double(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::String(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::String(v)
	}
}

impl From<SpecPath> for Value {
	fn from(v: SpecPath) -> Self {
		Self::Path(v)
	}
}

impl From<Dictionary> for Value {
	fn from(v: Dictionary) -> Self {
		Self::Dictionary(v)
	}
}

/// Looks up a nested value by `a:b:c` key path.
pub fn dict_get<'a>(dict: &'a Dictionary, key_path: &str) -> Option<&'a Value> {
	let mut keys = key_path.split(KEY_PATH_SEPARATOR);
	let mut current = dict.get(keys.next()?)?;
	for key in keys {
		current = current.as_dictionary()?.get(key)?;
	}
	Some(current)
}

/// Inserts a value at a nested key path, creating intermediate dictionaries.
///
/// Non-dictionary values found along the way are replaced by dictionaries.
pub fn dict_set(dict: &mut Dictionary, key_path: &str, value: Value) {
	match key_path.split_once(KEY_PATH_SEPARATOR) {
		None => {
			dict.insert(key_path.to_string(), value);
		}
		Some((head, rest)) => {
			let entry = dict
				.entry(head.to_string())
				.or_insert_with(|| Value::Dictionary(Dictionary::new()));
			if !matches!(entry, Value::Dictionary(_)) {
				*entry = Value::Dictionary(Dictionary::new());
			}
			if let Value::Dictionary(inner) = entry {
				dict_set(inner, rest, value);
			}
		}
	}
}

/// Removes the value at a nested key path.
///
/// Dictionaries left empty by the removal are removed from their parent.
/// Returns the removed value.
pub fn dict_erase(dict: &mut Dictionary, key_path: &str) -> Option<Value> {
	match key_path.split_once(KEY_PATH_SEPARATOR) {
		None => dict.remove(key_path),
		Some((head, rest)) => {
			let Some(Value::Dictionary(inner)) = dict.get_mut(head) else {
				return None;
			};
			let removed = dict_erase(inner, rest);
			if removed.is_some() && inner.is_empty() {
				dict.remove(head);
			}
			removed
		}
	}
}

/// Applies a key-path edit to a whole field value and returns the result.
///
/// Setting (`Some`) into an absent or non-dictionary field starts from an
/// empty dictionary. Erasing (`None`) from a dictionary prunes emptied
/// dictionaries and yields `None` once the field's dictionary is empty;
/// erasing from a non-dictionary field leaves it untouched.
pub fn edit_dict_field(field: Option<Value>, key_path: &str, value: Option<Value>) -> Option<Value> {
	match value {
		Some(value) => {
			let mut dict = match field {
				Some(Value::Dictionary(dict)) => dict,
				_ => Dictionary::new(),
			};
			dict_set(&mut dict, key_path, value);
			Some(Value::Dictionary(dict))
		}
		None => match field {
			Some(Value::Dictionary(mut dict)) => {
				dict_erase(&mut dict, key_path);
				(!dict.is_empty()).then_some(Value::Dictionary(dict))
			}
			other => other,
		},
	}
}
