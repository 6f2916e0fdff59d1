//! Raw spec storage and primitive mutations.
//!
//! [`LayerData`] is what a [`StateDelegate`](crate::StateDelegate) mutates.
//! Its `prim_*` methods apply a single primitive edit with no interception;
//! they are no-ops when the target spec is missing.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;
use tweak_primitives::value::{dict_get, edit_dict_field};
use tweak_primitives::{SpecPath, SpecType, TimeCode, Token, Value};


/// Callback fired when a layer transitions from clean to dirty.
pub type DirtyListener = Box<dyn FnMut(&str) + Send + Sync>;

/// A single node in a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
	/// Kind of spec.
	pub spec_type: SpecType,
	/// Whether the spec was created as a placeholder with no opinions.
	pub inert: bool,
	/// Named field values.
	pub fields: BTreeMap<Token, Value>,
	/// Time-sampled values.
	pub time_samples: BTreeMap<TimeCode, Value>,
}

impl Spec {
	/// Creates an empty spec of the given kind.
	pub fn new(spec_type: SpecType, inert: bool) -> Self {
		Self {
			spec_type,
			inert,
			fields: BTreeMap::new(),
			time_samples: BTreeMap::new(),
		}
	}
}

/// Deep copy of a spec and all of its descendants.
///
/// Specs are stored parent first, so replaying them in order recreates the
/// subtree top-down.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtreeSnapshot {
	root: SpecPath,
	specs: Vec<(SpecPath, Spec)>,
}

impl SubtreeSnapshot {
	/// Path of the snapshotted subtree root.
	pub fn root(&self) -> &SpecPath {
		&self.root
	}

	/// Captured specs, parent first.
	pub fn specs(&self) -> &[(SpecPath, Spec)] {
		&self.specs
	}

	/// Number of captured specs, including the root.
	pub fn len(&self) -> usize {
		self.specs.len()
	}

	/// Returns `true` if nothing was captured (the root did not exist).
	pub fn is_empty(&self) -> bool {
		self.specs.is_empty()
	}
}

/// Spec storage for a single layer.
pub struct LayerData {
	identifier: String,
	specs: BTreeMap<SpecPath, Spec>,
	dirty_listeners: Vec<DirtyListener>,
}

impl fmt::Debug for LayerData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LayerData")
			.field("identifier", &self.identifier)
			.field("specs", &self.specs)
			.field("dirty_listeners", &self.dirty_listeners.len())
			.finish()
	}
}

impl LayerData {
	/// Creates storage holding only the pseudo-root spec.
	pub fn new(identifier: impl Into<String>) -> Self {
		let mut specs = BTreeMap::new();
		specs.insert(SpecPath::root(), Spec::new(SpecType::PseudoRoot, false));
		Self {
			identifier: identifier.into(),
			specs,
			dirty_listeners: Vec::new(),
		}
	}

	/// Returns the layer identifier.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Returns `true` if a spec exists at `path`.
	pub fn has_spec(&self, path: &SpecPath) -> bool {
		self.specs.contains_key(path)
	}

	/// Returns the spec at `path`.
	pub fn spec(&self, path: &SpecPath) -> Option<&Spec> {
		self.specs.get(path)
	}

	/// Returns the kind of the spec at `path`.
	pub fn spec_type(&self, path: &SpecPath) -> Option<SpecType> {
		self.specs.get(path).map(|spec| spec.spec_type)
	}

	/// Iterates over all spec paths in order.
	pub fn spec_paths(&self) -> impl Iterator<Item = &SpecPath> {
		self.specs.keys()
	}

	/// Number of specs, including the pseudo-root.
	pub fn spec_count(&self) -> usize {
		self.specs.len()
	}

	/// Returns a field value.
	pub fn get_field(&self, path: &SpecPath, field: &str) -> Option<&Value> {
		self.specs.get(path)?.fields.get(field)
	}

	/// Returns a nested dictionary entry of a field.
	pub fn get_field_dict_value_by_key(
		&self,
		path: &SpecPath,
		field: &str,
		key_path: &str,
	) -> Option<&Value> {
		let dict = self.get_field(path, field)?.as_dictionary()?;
		dict_get(dict, key_path)
	}

	/// Returns the time sample at `time`.
	pub fn get_time_sample(&self, path: &SpecPath, time: TimeCode) -> Option<&Value> {
		self.specs.get(path)?.time_samples.get(&time)
	}

	/// Returns the elements of a child-list field (empty if unset).
	pub fn children(&self, parent: &SpecPath, field: &str) -> &[Value] {
		self.get_field(parent, field)
			.and_then(Value::as_array)
			.unwrap_or(&[])
	}

	/// Deep-copies the spec at `root` and every descendant.
	///
	/// This is O(subtree size).
	pub fn snapshot_subtree(&self, root: &SpecPath) -> SubtreeSnapshot {
		let specs = self
			.subtree(root)
			.map(|(path, spec)| (path.clone(), spec.clone()))
			.collect();
		SubtreeSnapshot {
			root: root.clone(),
			specs,
		}
	}

	fn subtree<'a>(&'a self, root: &'a SpecPath) -> impl Iterator<Item = (&'a SpecPath, &'a Spec)> {
		// Descendants sort contiguously right after their root.
		self.specs
			.range(root.clone()..)
			.take_while(move |(path, _)| path.has_prefix(root))
	}

	/// Registers a listener for clean-to-dirty transitions.
	///
	/// Listeners are called from inside the dirtying edit, so they must not
	/// try to lock the layer that owns this data.
	pub fn add_dirty_listener(&mut self, listener: DirtyListener) {
		self.dirty_listeners.push(listener);
	}

	/// Notifies dirty listeners. Called by delegates on the clean-to-dirty
	/// transition only.
	pub fn notify_dirty(&mut self) {
		trace!(layer = %self.identifier, "layer became dirty");
		for listener in &mut self.dirty_listeners {
			listener(&self.identifier);
		}
	}

	/// Sets (`Some`) or erases (`None`) a field.
	pub fn prim_set_field(&mut self, path: &SpecPath, field: &str, value: Option<Value>) {
		let Some(spec) = self.specs.get_mut(path) else {
			trace!(%path, field, "set_field: no spec");
			return;
		};
		match value {
			Some(value) => {
				spec.fields.insert(field.to_string(), value);
			}
			None => {
				spec.fields.remove(field);
			}
		}
	}

	/// Sets or erases a nested dictionary entry of a field.
	///
	/// Setting into a field that is not a dictionary replaces it with one.
	/// Erasing prunes emptied dictionaries and removes the field once its
	/// dictionary is empty.
	pub fn prim_set_field_dict_value_by_key(
		&mut self,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: Option<Value>,
	) {
		let Some(spec) = self.specs.get_mut(path) else {
			trace!(%path, field, key_path, "set_field_dict_value_by_key: no spec");
			return;
		};
		let current = spec.fields.remove(field);
		if let Some(edited) = edit_dict_field(current, key_path, value) {
			spec.fields.insert(field.to_string(), edited);
		}
	}

	/// Sets or erases a time sample.
	pub fn prim_set_time_sample(&mut self, path: &SpecPath, time: TimeCode, value: Option<Value>) {
		let Some(spec) = self.specs.get_mut(path) else {
			trace!(%path, %time, "set_time_sample: no spec");
			return;
		};
		match value {
			Some(value) => {
				spec.time_samples.insert(time, value);
			}
			None => {
				spec.time_samples.remove(&time);
			}
		}
	}

	/// Returns `true` if the parent of `path` exists. The pseudo-root has none.
	pub fn has_parent(&self, path: &SpecPath) -> bool {
		path.parent().is_some_and(|parent| self.specs.contains_key(&parent))
	}

	/// Returns `true` if [`prim_create_spec`](Self::prim_create_spec) would create anything.
	pub fn can_create_spec(&self, path: &SpecPath) -> bool {
		!self.specs.contains_key(path) && self.has_parent(path)
	}

	/// Creates an empty spec under an existing parent.
	///
	/// No-op if one already exists at `path` or its parent is missing.
	pub fn prim_create_spec(&mut self, path: &SpecPath, spec_type: SpecType, inert: bool) -> bool {
		if !self.can_create_spec(path) {
			trace!(%path, "create_spec: exists or has no parent");
			return false;
		}
		self.specs.insert(path.clone(), Spec::new(spec_type, inert));
		true
	}

	/// Deletes the spec at `path` together with all its descendants.
	///
	/// The pseudo-root cannot be deleted.
	pub fn prim_delete_spec(&mut self, path: &SpecPath) -> bool {
		if path.is_root() || !self.specs.contains_key(path) {
			trace!(%path, "delete_spec: nothing to delete");
			return false;
		}
		let doomed: Vec<SpecPath> = self.subtree(path).map(|(p, _)| p.clone()).collect();
		for p in &doomed {
			self.specs.remove(p);
		}
		true
	}

	/// Returns `true` if [`prim_move_spec`](Self::prim_move_spec) would move anything.
	pub fn can_move_spec(&self, old: &SpecPath, new: &SpecPath) -> bool {
		!old.is_root()
			&& !new.is_root()
			&& self.specs.contains_key(old)
			&& !new.has_prefix(old)
			&& old.is_property() == new.is_property()
			&& self.has_parent(new)
			&& self.subtree(new).next().is_none()
	}

	/// Moves the spec at `old` and all its descendants under `new`.
	///
	/// No-op if `old` is missing, the parent of `new` is missing, `new` or
	/// anything below it is occupied, or `new` lies inside the moved subtree.
	pub fn prim_move_spec(&mut self, old: &SpecPath, new: &SpecPath) -> bool {
		if !self.can_move_spec(old, new) {
			trace!(%old, %new, "move_spec: invalid move");
			return false;
		}
		let moved: Vec<SpecPath> = self.subtree(old).map(|(p, _)| p.clone()).collect();
		let mut relocated = Vec::with_capacity(moved.len());
		for p in moved {
			let Some(target) = p.replace_prefix(old, new) else {
				trace!(path = %p, %new, "move_spec: path cannot be rewritten");
				continue;
			};
			if let Some(spec) = self.specs.remove(&p) {
				relocated.push((target, spec));
			}
		}
		self.specs.extend(relocated);
		true
	}

	/// Appends `value` to the child-list field of `parent`.
	pub fn prim_push_child(&mut self, parent: &SpecPath, field: &str, value: Value) {
		let Some(spec) = self.specs.get_mut(parent) else {
			trace!(%parent, field, "push_child: no spec");
			return;
		};
		match spec.fields.get_mut(field) {
			Some(Value::Array(items)) => items.push(value),
			Some(_) => trace!(%parent, field, "push_child: field is not a list"),
			None => {
				spec.fields.insert(field.to_string(), Value::Array(vec![value]));
			}
		}
	}

	/// Removes the last element of the child-list field of `parent`.
	///
	/// The element must equal `expected`; otherwise nothing is removed. The
	/// field is erased once the list is empty.
	pub fn prim_pop_child(&mut self, parent: &SpecPath, field: &str, expected: &Value) -> bool {
		let Some(spec) = self.specs.get_mut(parent) else {
			trace!(%parent, field, "pop_child: no spec");
			return false;
		};
		let Some(Value::Array(items)) = spec.fields.get_mut(field) else {
			return false;
		};
		if items.last() != Some(expected) {
			trace!(%parent, field, "pop_child: last child does not match");
			return false;
		}
		items.pop();
		if items.is_empty() {
			spec.fields.remove(field);
		}
		true
	}
}
