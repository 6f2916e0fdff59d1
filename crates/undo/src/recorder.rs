//! The recording state delegate.
//!
//! [`MutationRecorder`] sits between a [`Layer`](tweak_layer::Layer) and its
//! storage. Every primitive edit is turned into an [`Instruction`] carrying
//! the state it overwrote, stored, and only then applied. Edits that would
//! not change anything (missing spec, invalid move, mismatched pop) are
//! passed through unrecorded so every stored instruction is an exact inverse.

use tracing::{trace, warn};
use tweak_layer::{DirtyState, LayerData, LayerHandle, StateDelegate, WeakLayer};
use tweak_primitives::value::edit_dict_field;
use tweak_primitives::{SpecPath, SpecType, TimeCode, Value};

use crate::instruction::{
	CreateSpec, DeleteSpec, Instruction, MoveSpec, PopChild, PushChild, SetField, SetFieldDictValueByKey,
	SetTimeSample,
};
use crate::instruction_set::SharedInstructions;

/// State delegate that records every mutation into an instruction set.
pub struct MutationRecorder {
	instructions: SharedInstructions,
	layer: WeakLayer,
	dirty: DirtyState,
}

impl MutationRecorder {
	/// Creates a recorder for `layer` appending into `instructions`.
	pub fn new(instructions: SharedInstructions, layer: &LayerHandle) -> Self {
		Self {
			instructions,
			layer: layer.downgrade(),
			dirty: DirtyState::default(),
		}
	}

	/// Returns the set this recorder appends into.
	pub fn instructions(&self) -> &SharedInstructions {
		&self.instructions
	}

	fn store(&self, instruction: impl Into<Instruction>) {
		let instruction = instruction.into();
		match self.instructions.try_lock() {
			Some(mut set) => set.store_instruction(instruction),
			None => warn!(
				kind = instruction.kind(),
				"instruction set is busy; edit applied without recording"
			),
		}
	}
}

impl std::fmt::Debug for MutationRecorder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MutationRecorder")
			.field("layer", &self.layer)
			.field("dirty", &self.dirty)
			.finish_non_exhaustive()
	}
}

impl StateDelegate for MutationRecorder {
	fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	fn set_dirty(&mut self, dirty: bool) {
		self.dirty.set(dirty);
	}

	fn set_field(&mut self, data: &mut LayerData, path: &SpecPath, field: &str, value: Option<Value>) {
		if !data.has_spec(path) {
			trace!(%path, field, "set_field: no spec, not recorded");
			return;
		}
		let previous = data.get_field(path, field).cloned();
		self.store(SetField {
			layer: self.layer.clone(),
			path: path.clone(),
			field: field.to_string(),
			value: value.clone(),
			previous,
		});
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
		if !data.has_spec(path) {
			trace!(%path, field, key_path, "set_field_dict_value_by_key: no spec, not recorded");
			return;
		}
		let current = data.get_field(path, field).cloned();
		let previous = data.get_field_dict_value_by_key(path, field, key_path).cloned();

		// A key-level inverse cannot restore a scalar field or an empty
		// dictionary that the edit replaced; fall back to the whole field.
		let after = edit_dict_field(current.clone(), key_path, value.clone());
		let restored = edit_dict_field(after.clone(), key_path, previous.clone());
		if restored == current {
			self.store(SetFieldDictValueByKey {
				layer: self.layer.clone(),
				path: path.clone(),
				field: field.to_string(),
				key_path: key_path.to_string(),
				value: value.clone(),
				previous,
			});
		} else {
			trace!(%path, field, key_path, "dictionary edit recorded as whole field");
			self.store(SetField {
				layer: self.layer.clone(),
				path: path.clone(),
				field: field.to_string(),
				value: after,
				previous: current,
			});
		}
		data.prim_set_field_dict_value_by_key(path, field, key_path, value);
		self.dirty.mark(data);
	}

	fn set_time_sample(&mut self, data: &mut LayerData, path: &SpecPath, time: TimeCode, value: Option<Value>) {
		if !data.has_spec(path) {
			trace!(%path, %time, "set_time_sample: no spec, not recorded");
			return;
		}
		let previous = data.get_time_sample(path, time).cloned();
		self.store(SetTimeSample {
			layer: self.layer.clone(),
			path: path.clone(),
			time,
			value: value.clone(),
			previous,
		});
		data.prim_set_time_sample(path, time, value);
		self.dirty.mark(data);
	}

	fn create_spec(&mut self, data: &mut LayerData, path: &SpecPath, spec_type: SpecType, inert: bool) {
		if !data.can_create_spec(path) {
			trace!(%path, "create_spec: exists or has no parent, not recorded");
			return;
		}
		self.store(CreateSpec {
			layer: self.layer.clone(),
			path: path.clone(),
			spec_type,
			inert,
		});
		data.prim_create_spec(path, spec_type, inert);
		self.dirty.mark(data);
	}

	fn delete_spec(&mut self, data: &mut LayerData, path: &SpecPath, inert: bool) {
		if path.is_root() || !data.has_spec(path) {
			trace!(%path, "delete_spec: nothing to delete, not recorded");
			return;
		}
		let snapshot = data.snapshot_subtree(path);
		trace!(%path, specs = snapshot.len(), "delete_spec: subtree captured");
		self.store(DeleteSpec {
			layer: self.layer.clone(),
			path: path.clone(),
			inert,
			snapshot,
		});
		data.prim_delete_spec(path);
		self.dirty.mark(data);
	}

	fn move_spec(&mut self, data: &mut LayerData, old: &SpecPath, new: &SpecPath) {
		if !data.can_move_spec(old, new) {
			trace!(%old, %new, "move_spec: invalid move, not recorded");
			return;
		}
		self.store(MoveSpec {
			layer: self.layer.clone(),
			old_path: old.clone(),
			new_path: new.clone(),
		});
		data.prim_move_spec(old, new);
		self.dirty.mark(data);
	}

	fn push_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, value: Value) {
		let appendable = data.has_spec(parent)
			&& matches!(data.get_field(parent, field), None | Some(Value::Array(_)));
		if !appendable {
			trace!(%parent, field, "push_child: not a child list, not recorded");
			return;
		}
		self.store(PushChild {
			layer: self.layer.clone(),
			parent: parent.clone(),
			field: field.to_string(),
			value: value.clone(),
		});
		data.prim_push_child(parent, field, value);
		self.dirty.mark(data);
	}

	fn pop_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, old_value: &Value) {
		if data.children(parent, field).last() != Some(old_value) {
			trace!(%parent, field, "pop_child: last child does not match, not recorded");
			return;
		}
		self.store(PopChild {
			layer: self.layer.clone(),
			parent: parent.clone(),
			field: field.to_string(),
			value: old_value.clone(),
		});
		data.prim_pop_child(parent, field, old_value);
		self.dirty.mark(data);
	}
}
