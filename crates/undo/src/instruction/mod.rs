//! Reversible records of primitive layer mutations.
//!
//! Each record captures one edit together with whatever is needed to invert
//! it (the previous value, or a snapshot of a deleted subtree). Records hold
//! a [`WeakLayer`]: replaying against a closed layer does nothing.
//!
//! Replay goes through the layer's public mutation API, so whatever delegate
//! is installed at replay time sees the edits like any other.

use tracing::{trace, warn};
use tweak_layer::{Layer, SubtreeSnapshot, WeakLayer};
use tweak_primitives::{SpecPath, SpecType, TimeCode, Token, Value};


/// Forward and inverse replay of a recorded edit.
pub trait Replay {
	/// Re-applies the edit.
	fn do_it(&self);
	/// Applies the inverse of the edit.
	fn undo_it(&self);
}

/// Runs `f` on the target layer, skipping closed or busy layers.
fn on_layer(layer: &WeakLayer, kind: &'static str, f: impl FnOnce(&mut Layer)) {
	let Some(handle) = layer.upgrade() else {
		trace!(kind, "replay skipped: layer closed");
		return;
	};
	if handle.try_with_mut(f).is_none() {
		warn!(kind, "replay skipped: layer is locked");
	}
}

/// A field was set or erased.
#[derive(Debug, Clone)]
pub struct SetField {
	pub layer: WeakLayer,
	pub path: SpecPath,
	pub field: Token,
	pub value: Option<Value>,
	pub previous: Option<Value>,
}

impl Replay for SetField {
	fn do_it(&self) {
		on_layer(&self.layer, "SetField", |layer| {
			layer.set_field_opt(&self.path, &self.field, self.value.clone())
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "SetField", |layer| {
			layer.set_field_opt(&self.path, &self.field, self.previous.clone())
		});
	}
}

/// One key of a dictionary field was set or erased.
#[derive(Debug, Clone)]
pub struct SetFieldDictValueByKey {
	pub layer: WeakLayer,
	pub path: SpecPath,
	pub field: Token,
	pub key_path: Token,
	pub value: Option<Value>,
	pub previous: Option<Value>,
}

impl Replay for SetFieldDictValueByKey {
	fn do_it(&self) {
		on_layer(&self.layer, "SetFieldDictValueByKey", |layer| {
			layer.set_field_dict_value_by_key_opt(&self.path, &self.field, &self.key_path, self.value.clone())
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "SetFieldDictValueByKey", |layer| {
			layer.set_field_dict_value_by_key_opt(&self.path, &self.field, &self.key_path, self.previous.clone())
		});
	}
}

/// A time sample was set or erased.
#[derive(Debug, Clone)]
pub struct SetTimeSample {
	pub layer: WeakLayer,
	pub path: SpecPath,
	pub time: TimeCode,
	pub value: Option<Value>,
	pub previous: Option<Value>,
}

impl Replay for SetTimeSample {
	fn do_it(&self) {
		on_layer(&self.layer, "SetTimeSample", |layer| {
			layer.set_time_sample_opt(&self.path, self.time, self.value.clone())
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "SetTimeSample", |layer| {
			layer.set_time_sample_opt(&self.path, self.time, self.previous.clone())
		});
	}
}

/// An empty spec was created.
#[derive(Debug, Clone)]
pub struct CreateSpec {
	pub layer: WeakLayer,
	pub path: SpecPath,
	pub spec_type: SpecType,
	pub inert: bool,
}

impl Replay for CreateSpec {
	fn do_it(&self) {
		on_layer(&self.layer, "CreateSpec", |layer| {
			layer.create_spec(&self.path, self.spec_type, self.inert)
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "CreateSpec", |layer| layer.delete_spec(&self.path, self.inert));
	}
}

/// A spec and its subtree were deleted.
///
/// The snapshot is taken before deletion; undo recreates every captured spec
/// parent first, then restores its fields and time samples.
#[derive(Debug, Clone)]
pub struct DeleteSpec {
	pub layer: WeakLayer,
	pub path: SpecPath,
	pub inert: bool,
	pub snapshot: SubtreeSnapshot,
}

impl Replay for DeleteSpec {
	fn do_it(&self) {
		on_layer(&self.layer, "DeleteSpec", |layer| layer.delete_spec(&self.path, self.inert));
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "DeleteSpec", |layer| {
			for (path, spec) in self.snapshot.specs() {
				layer.create_spec(path, spec.spec_type, spec.inert);
				for (field, value) in &spec.fields {
					layer.set_field_opt(path, field, Some(value.clone()));
				}
				for (time, value) in &spec.time_samples {
					layer.set_time_sample_opt(path, *time, Some(value.clone()));
				}
			}
		});
	}
}

/// A spec subtree was moved to a new path.
#[derive(Debug, Clone)]
pub struct MoveSpec {
	pub layer: WeakLayer,
	pub old_path: SpecPath,
	pub new_path: SpecPath,
}

impl Replay for MoveSpec {
	fn do_it(&self) {
		on_layer(&self.layer, "MoveSpec", |layer| layer.move_spec(&self.old_path, &self.new_path));
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "MoveSpec", |layer| layer.move_spec(&self.new_path, &self.old_path));
	}
}

/// A value was appended to a child list.
#[derive(Debug, Clone)]
pub struct PushChild {
	pub layer: WeakLayer,
	pub parent: SpecPath,
	pub field: Token,
	pub value: Value,
}

impl Replay for PushChild {
	fn do_it(&self) {
		on_layer(&self.layer, "PushChild", |layer| {
			layer.push_child(&self.parent, &self.field, self.value.clone())
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "PushChild", |layer| {
			layer.pop_child(&self.parent, &self.field, &self.value)
		});
	}
}

/// The last value of a child list was removed.
#[derive(Debug, Clone)]
pub struct PopChild {
	pub layer: WeakLayer,
	pub parent: SpecPath,
	pub field: Token,
	pub value: Value,
}

impl Replay for PopChild {
	fn do_it(&self) {
		on_layer(&self.layer, "PopChild", |layer| {
			layer.pop_child(&self.parent, &self.field, &self.value)
		});
	}

	fn undo_it(&self) {
		on_layer(&self.layer, "PopChild", |layer| {
			layer.push_child(&self.parent, &self.field, self.value.clone())
		});
	}
}

macro_rules! instructions {
	($($variant:ident),* $(,)?) => {
		/// Any recorded mutation.
		#[derive(Debug, Clone)]
		pub enum Instruction {
			$($variant($variant),)*
		}

		impl Instruction {
			/// Name of the mutation kind, for logging.
			pub fn kind(&self) -> &'static str {
				match self {
					$(Self::$variant(_) => stringify!($variant),)*
				}
			}

			/// The layer the mutation was recorded on.
			pub fn layer(&self) -> &WeakLayer {
				match self {
					$(Self::$variant(i) => &i.layer,)*
				}
			}
		}

		impl Replay for Instruction {
			fn do_it(&self) {
				match self {
					$(Self::$variant(i) => i.do_it(),)*
				}
			}

			fn undo_it(&self) {
				match self {
					$(Self::$variant(i) => i.undo_it(),)*
				}
			}
		}

		$(
			impl From<$variant> for Instruction {
				fn from(instruction: $variant) -> Self {
					Self::$variant(instruction)
				}
			}
		)*
	};
}

instructions!(
	SetField,
	SetFieldDictValueByKey,
	SetTimeSample,
	CreateSpec,
	DeleteSpec,
	MoveSpec,
	PushChild,
	PopChild,
);
