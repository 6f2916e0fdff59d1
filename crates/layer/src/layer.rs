use std::fmt;

use tracing::debug;
use tweak_primitives::{SpecPath, SpecType, TimeCode, Value, fields};

use crate::data::LayerData;
use crate::delegate::{SimpleStateDelegate, StateDelegate};
use crate::error::{LayerError, Result};

/// A scene description document.
///
/// All mutations are forwarded to the installed [`StateDelegate`]. Read
/// access goes straight to [`LayerData`] through [`Layer::data`].
pub struct Layer {
	data: LayerData,
	delegate: Box<dyn StateDelegate>,
}

impl fmt::Debug for Layer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Layer")
			.field("data", &self.data)
			.field("dirty", &self.delegate.is_dirty())
			.finish_non_exhaustive()
	}
}

impl Layer {
	/// Creates an empty layer with the default delegate installed.
	pub fn new(identifier: impl Into<String>) -> Self {
		Self {
			data: LayerData::new(identifier),
			delegate: Box::new(SimpleStateDelegate::new()),
		}
	}

	/// Returns the layer identifier.
	pub fn identifier(&self) -> &str {
		self.data.identifier()
	}

	/// Read-only access to the layer's specs.
	pub fn data(&self) -> &LayerData {
		&self.data
	}

	/// Returns the installed delegate.
	pub fn state_delegate(&self) -> &dyn StateDelegate {
		self.delegate.as_ref()
	}

	/// Installs `delegate`, returning the one it replaces.
	///
	/// The new delegate inherits the layer's current dirty state.
	pub fn set_state_delegate(&mut self, mut delegate: Box<dyn StateDelegate>) -> Box<dyn StateDelegate> {
		delegate.set_dirty(self.delegate.is_dirty());
		std::mem::replace(&mut self.delegate, delegate)
	}

	/// Returns `true` if the layer has unsaved changes.
	pub fn is_dirty(&self) -> bool {
		self.delegate.is_dirty()
	}

	/// Marks the current state as clean (e.g. after saving).
	pub fn mark_clean(&mut self) {
		self.delegate.set_dirty(false);
	}

	/// Registers a listener fired on every clean-to-dirty transition.
	///
	/// Listeners run inside the edit that dirtied the layer, while its
	/// [`LayerHandle`](crate::LayerHandle) is write-locked. A listener must
	/// not lock that handle again; capture whatever state it needs instead.
	pub fn on_dirty(&mut self, listener: impl FnMut(&str) + Send + Sync + 'static) {
		self.data.add_dirty_listener(Box::new(listener));
	}

	/// Sets a field on the spec at `path`. No-op if the spec is missing.
	pub fn set_field(&mut self, path: &SpecPath, field: &str, value: impl Into<Value>) {
		self.delegate.set_field(&mut self.data, path, field, Some(value.into()));
	}

	/// Removes a field from the spec at `path`.
	pub fn erase_field(&mut self, path: &SpecPath, field: &str) {
		self.delegate.set_field(&mut self.data, path, field, None);
	}

	/// Sets or erases a field, matching the delegate's `Option` convention.
	pub fn set_field_opt(&mut self, path: &SpecPath, field: &str, value: Option<Value>) {
		self.delegate.set_field(&mut self.data, path, field, value);
	}

	/// Sets the entry at a `:`-separated key path inside a dictionary field.
	pub fn set_field_dict_value_by_key(
		&mut self,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: impl Into<Value>,
	) {
		self.delegate
			.set_field_dict_value_by_key(&mut self.data, path, field, key_path, Some(value.into()));
	}

	/// Removes the entry at `key_path`, pruning dictionaries left empty.
	pub fn erase_field_dict_value_by_key(&mut self, path: &SpecPath, field: &str, key_path: &str) {
		self.delegate
			.set_field_dict_value_by_key(&mut self.data, path, field, key_path, None);
	}

	/// Sets or erases a dictionary entry, matching the delegate's `Option` convention.
	pub fn set_field_dict_value_by_key_opt(
		&mut self,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: Option<Value>,
	) {
		self.delegate
			.set_field_dict_value_by_key(&mut self.data, path, field, key_path, value);
	}

	/// Sets the sample at `time` on the attribute at `path`.
	pub fn set_time_sample(&mut self, path: &SpecPath, time: impl Into<TimeCode>, value: impl Into<Value>) {
		self.delegate
			.set_time_sample(&mut self.data, path, time.into(), Some(value.into()));
	}

	/// Removes the sample at `time`.
	pub fn erase_time_sample(&mut self, path: &SpecPath, time: impl Into<TimeCode>) {
		self.delegate.set_time_sample(&mut self.data, path, time.into(), None);
	}

	/// Sets or erases a time sample, matching the delegate's `Option` convention.
	pub fn set_time_sample_opt(&mut self, path: &SpecPath, time: TimeCode, value: Option<Value>) {
		self.delegate.set_time_sample(&mut self.data, path, time, value);
	}

	/// Creates an empty spec. No-op if `path` exists or its parent does not.
	pub fn create_spec(&mut self, path: &SpecPath, spec_type: SpecType, inert: bool) {
		self.delegate.create_spec(&mut self.data, path, spec_type, inert);
	}

	/// Deletes the spec at `path` and everything below it.
	pub fn delete_spec(&mut self, path: &SpecPath, inert: bool) {
		self.delegate.delete_spec(&mut self.data, path, inert);
	}

	/// Moves a spec and its descendants to `new`, which must be free and have
	/// an existing parent.
	pub fn move_spec(&mut self, old: &SpecPath, new: &SpecPath) {
		self.delegate.move_spec(&mut self.data, old, new);
	}

	/// Appends `value` to a child-list field such as `primChildren`.
	pub fn push_child(&mut self, parent: &SpecPath, field: &str, value: Value) {
		self.delegate.push_child(&mut self.data, parent, field, value);
	}

	/// Pops the last element of a child-list field, but only if it equals
	/// `old_value`; otherwise the list is left alone.
	pub fn pop_child(&mut self, parent: &SpecPath, field: &str, old_value: &Value) {
		self.delegate.pop_child(&mut self.data, parent, field, old_value);
	}

	/// Creates a prim spec under `parent` and registers it as a child.
	///
	/// An empty `type_name` leaves the prim untyped. Defining an existing prim
	/// returns its path unchanged.
	///
	/// # Errors
	///
	/// Fails if `name` is not an identifier or `parent` does not exist.
	pub fn define_prim(&mut self, parent: &SpecPath, name: &str, type_name: &str) -> Result<SpecPath> {
		let path = parent.append_child(name)?;
		if self.data.has_spec(&path) {
			return Ok(path);
		}
		if !self.data.has_spec(parent) {
			return Err(LayerError::MissingSpec(parent.clone()));
		}
		debug!(layer = %self.identifier(), %path, type_name, "define prim");
		self.create_spec(&path, SpecType::Prim, false);
		self.push_child(parent, fields::PRIM_CHILDREN, Value::token(name));
		if !type_name.is_empty() {
			self.set_field(&path, fields::TYPE_NAME, Value::token(type_name));
		}
		Ok(path)
	}

	/// Creates an attribute spec on `prim` with a default value.
	///
	/// # Errors
	///
	/// Fails if `name` is not an identifier, `prim` does not exist, or the
	/// attribute already exists.
	pub fn define_attribute(&mut self, prim: &SpecPath, name: &str, default: impl Into<Value>) -> Result<SpecPath> {
		let path = prim.append_property(name)?;
		if !self.data.has_spec(prim) {
			return Err(LayerError::MissingSpec(prim.clone()));
		}
		if self.data.has_spec(&path) {
			return Err(LayerError::SpecExists(path));
		}
		self.create_spec(&path, SpecType::Attribute, false);
		self.push_child(prim, fields::PROPERTY_CHILDREN, Value::token(name));
		self.set_field(&path, fields::DEFAULT, default);
		Ok(path)
	}

	/// Removes a prim spec, its subtree, and its entry in the parent's child list.
	///
	/// # Errors
	///
	/// Fails if there is no prim at `path`.
	pub fn remove_prim(&mut self, path: &SpecPath) -> Result<()> {
		let parent = match path.parent() {
			Some(parent) if self.data.has_spec(path) => parent,
			_ => return Err(LayerError::MissingSpec(path.clone())),
		};
		debug!(layer = %self.identifier(), %path, "remove prim");

		let name = Value::token(path.name());
		let children = self.data.children(&parent, fields::PRIM_CHILDREN);
		if children.last() == Some(&name) {
			self.pop_child(&parent, fields::PRIM_CHILDREN, &name);
		} else if children.contains(&name) {
			let remaining: Vec<Value> = children.iter().filter(|c| **c != name).cloned().collect();
			self.set_child_list(&parent, fields::PRIM_CHILDREN, remaining);
		}
		self.delete_spec(path, false);
		Ok(())
	}

	/// Renames a prim in place, keeping its position among its siblings.
	///
	/// # Errors
	///
	/// Fails if there is no prim at `path`, `new_name` is not an identifier,
	/// or a sibling already has that name.
	pub fn rename_prim(&mut self, path: &SpecPath, new_name: &str) -> Result<SpecPath> {
		let parent = match path.parent() {
			Some(parent) if self.data.has_spec(path) => parent,
			_ => return Err(LayerError::MissingSpec(path.clone())),
		};
		let new_path = parent.append_child(new_name)?;
		if self.data.has_spec(&new_path) {
			return Err(LayerError::SpecExists(new_path));
		}
		debug!(layer = %self.identifier(), %path, %new_path, "rename prim");

		let old_name = Value::token(path.name());
		let renamed: Vec<Value> = self
			.data
			.children(&parent, fields::PRIM_CHILDREN)
			.iter()
			.map(|c| if *c == old_name { Value::token(new_name) } else { c.clone() })
			.collect();
		self.move_spec(path, &new_path);
		self.set_child_list(&parent, fields::PRIM_CHILDREN, renamed);
		Ok(new_path)
	}

	fn set_child_list(&mut self, parent: &SpecPath, field: &str, children: Vec<Value>) {
		let value = (!children.is_empty()).then_some(Value::Array(children));
		self.set_field_opt(parent, field, value);
	}
}
