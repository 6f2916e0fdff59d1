//! Layer state delegates.
//!
//! A [`StateDelegate`] is the single point through which every primitive
//! mutation of a [`Layer`](crate::Layer) reaches its [`LayerData`]. Exactly
//! one delegate is installed per layer; replacing it hands back the previous
//! one so the caller can restore it later.

use tweak_primitives::{SpecPath, SpecType, TimeCode, Value};

use crate::data::LayerData;

/// Mutation sink installed on a layer.
///
/// Each method receives the layer's storage and is responsible for applying
/// the primitive edit, typically by calling the matching `prim_*` method on
/// [`LayerData`]. A `None` value means erase.
pub trait StateDelegate: Send + Sync {
	/// Returns `true` if the layer has changed since it was last marked clean.
	fn is_dirty(&self) -> bool;

	/// Overwrites the dirty state without notifying listeners.
	///
	/// Used when the delegate is installed (to inherit the layer's state)
	/// and when the layer is marked clean.
	fn set_dirty(&mut self, dirty: bool);

	fn set_field(&mut self, data: &mut LayerData, path: &SpecPath, field: &str, value: Option<Value>);

	fn set_field_dict_value_by_key(
		&mut self,
		data: &mut LayerData,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: Option<Value>,
	);

	fn set_time_sample(&mut self, data: &mut LayerData, path: &SpecPath, time: TimeCode, value: Option<Value>);

	fn create_spec(&mut self, data: &mut LayerData, path: &SpecPath, spec_type: SpecType, inert: bool);

	/// Deletes the spec at `path` and its whole subtree.
	fn delete_spec(&mut self, data: &mut LayerData, path: &SpecPath, inert: bool);

	fn move_spec(&mut self, data: &mut LayerData, old: &SpecPath, new: &SpecPath);

	fn push_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, value: Value);

	/// Pops the last child of a list field; `old_value` is the expected element.
	fn pop_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, old_value: &Value);
}

/// Dirty flag with exactly-once clean-to-dirty notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirtyState {
	dirty: bool,
}

impl DirtyState {
	/// Returns the current flag.
	pub fn get(self) -> bool {
		self.dirty
	}

	/// Overwrites the flag silently.
	pub fn set(&mut self, dirty: bool) {
		self.dirty = dirty;
	}

	/// Marks dirty, notifying the layer's listeners only on the transition.
	///
	/// Returns `true` if this call performed the transition.
	pub fn mark(&mut self, data: &mut LayerData) -> bool {
		if self.dirty {
			return false;
		}
		self.dirty = true;
		data.notify_dirty();
		true
	}
}

/// Default delegate: applies every mutation directly.
#[derive(Debug, Default)]
pub struct SimpleStateDelegate {
	dirty: DirtyState,
}

impl SimpleStateDelegate {
	/// Creates a clean delegate.
	pub fn new() -> Self {
		Self::default()
	}
}

impl StateDelegate for SimpleStateDelegate {
	fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	fn set_dirty(&mut self, dirty: bool) {
		self.dirty.set(dirty);
	}

	fn set_field(&mut self, data: &mut LayerData, path: &SpecPath, field: &str, value: Option<Value>) {
		data.prim_set_field(path, field, value);
		self.dirty.mark(data);
	}

	fn set_field_dict_value_by_key(
		&mut self,
		data: &mut LayerData,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: Option<Value>,
	) {
		data.prim_set_field_dict_value_by_key(path, field, key_path, value);
		self.dirty.mark(data);
	}

	fn set_time_sample(&mut self, data: &mut LayerData, path: &SpecPath, time: TimeCode, value: Option<Value>) {
		data.prim_set_time_sample(path, time, value);
		self.dirty.mark(data);
	}

	fn create_spec(&mut self, data: &mut LayerData, path: &SpecPath, spec_type: SpecType, inert: bool) {
		if data.prim_create_spec(path, spec_type, inert) {
			self.dirty.mark(data);
		}
	}

	fn delete_spec(&mut self, data: &mut LayerData, path: &SpecPath, _inert: bool) {
		if data.prim_delete_spec(path) {
			self.dirty.mark(data);
		}
	}

	fn move_spec(&mut self, data: &mut LayerData, old: &SpecPath, new: &SpecPath) {
		if data.prim_move_spec(old, new) {
			self.dirty.mark(data);
		}
	}

	fn push_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, value: Value) {
		data.prim_push_child(parent, field, value);
		self.dirty.mark(data);
	}

	fn pop_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, old_value: &Value) {
		if data.prim_pop_child(parent, field, old_value) {
			self.dirty.mark(data);
		}
	}
}
