//! Randomized edit sequences: undoing everything restores the start state,
//! redoing everything restores the end state.

use proptest::prelude::*;
use tweak_layer::Layer;
use tweak_primitives::{SpecPath, SpecType, Value, fields};
use tweak_undo::CommandStack;

use crate::common::{scene, state};

const NAMES: [&str; 4] = ["World", "Cube", "Light", "Rig"];

#[derive(Debug, Clone)]
enum Edit {
	Define { parent: usize, name: usize },
	Remove { target: usize },
	Rename { target: usize, name: usize },
	Move { target: usize, parent: Option<usize> },
	SetField { target: usize, value: i64 },
	SetMeta { target: usize, key: usize, value: i64 },
	EraseMeta { target: usize, key: usize },
	Sample { target: usize, time: u8, value: i64 },
}

fn edit() -> impl Strategy<Value = Edit> {
	let idx = 0..NAMES.len();
	prop_oneof![
		(idx.clone(), idx.clone()).prop_map(|(parent, name)| Edit::Define { parent, name }),
		idx.clone().prop_map(|target| Edit::Remove { target }),
		(idx.clone(), idx.clone()).prop_map(|(target, name)| Edit::Rename { target, name }),
		(idx.clone(), prop::option::of(idx.clone())).prop_map(|(target, parent)| Edit::Move { target, parent }),
		(idx.clone(), any::<i64>()).prop_map(|(target, value)| Edit::SetField { target, value }),
		(idx.clone(), 0..3usize, any::<i64>()).prop_map(|(target, key, value)| Edit::SetMeta {
			target,
			key,
			value
		}),
		(idx.clone(), 0..3usize).prop_map(|(target, key)| Edit::EraseMeta { target, key }),
		(idx, 0..4u8, any::<i64>()).prop_map(|(target, time, value)| Edit::Sample { target, time, value }),
	]
}

/// Finds the first existing prim named `NAMES[index]`, in path order.
fn find(layer: &Layer, index: usize) -> Option<SpecPath> {
	let name = NAMES[index];
	layer
		.data()
		.spec_paths()
		.find(|p| !p.is_root() && !p.is_property() && p.name() == name)
		.cloned()
}

const META_KEYS: [&str; 3] = ["a", "a:b", "c:d"];

fn apply(layer: &mut Layer, edit: &Edit) {
	match *edit {
		Edit::Define { parent, name } => {
			let parent = find(layer, parent).unwrap_or_else(SpecPath::root);
			let _ = layer.define_prim(&parent, NAMES[name], "Xform");
		}
		Edit::Remove { target } => {
			if let Some(p) = find(layer, target) {
				let _ = layer.remove_prim(&p);
			}
		}
		Edit::Rename { target, name } => {
			if let Some(p) = find(layer, target) {
				let _ = layer.rename_prim(&p, NAMES[name]);
			}
		}
		Edit::Move { target, parent } => {
			let Some(p) = find(layer, target) else {
				return;
			};
			let parent = parent.and_then(|i| find(layer, i)).unwrap_or_else(SpecPath::root);
			if let Ok(dest) = parent.append_child(p.name()) {
				layer.move_spec(&p, &dest);
			}
		}
		Edit::SetField { target, value } => {
			if let Some(p) = find(layer, target) {
				layer.set_field(&p, "weight", value);
			}
		}
		Edit::SetMeta { target, key, value } => {
			if let Some(p) = find(layer, target) {
				layer.set_field_dict_value_by_key(&p, fields::CUSTOM_DATA, META_KEYS[key], value);
			}
		}
		Edit::EraseMeta { target, key } => {
			if let Some(p) = find(layer, target) {
				layer.erase_field_dict_value_by_key(&p, fields::CUSTOM_DATA, META_KEYS[key]);
			}
		}
		Edit::Sample { target, time, value } => {
			if let Some(p) = find(layer, target) {
				if let Ok(attr) = p.append_property("size") {
					layer.create_spec(&attr, SpecType::Attribute, false);
					layer.set_time_sample(&attr, f64::from(time), Value::Int(value));
				}
			}
		}
	}
}

proptest! {
	#[test]
	fn undo_all_redo_all(edits in prop::collection::vec(edit(), 1..24)) {
		let handle = scene();
		let mut stack = CommandStack::new();
		let initial = state(&handle);

		for edit in edits {
			stack.wrap_as_transaction(&handle, "edit", move |layer| apply(layer, &edit));
			stack.process_pending();
		}
		let last = state(&handle);
		let steps = stack.len();

		for _ in 0..steps {
			prop_assert!(stack.undo());
		}
		prop_assert_eq!(&state(&handle), &initial);

		for _ in 0..steps {
			prop_assert!(stack.redo());
		}
		prop_assert_eq!(&state(&handle), &last);
	}

	#[test]
	fn interleaved_undo_keeps_prefix(edits in prop::collection::vec(edit(), 2..16), undo_at in 1usize..8) {
		let handle = scene();
		let mut stack = CommandStack::new();
		let mut checkpoints = vec![state(&handle)];

		for (i, edit) in edits.into_iter().enumerate() {
			let before = stack.position();
			stack.wrap_as_transaction(&handle, "edit", move |layer| apply(layer, &edit));
			stack.process_pending();
			if stack.position() > before {
				checkpoints.push(state(&handle));
			}
			if i == undo_at && stack.undo() {
				checkpoints.pop();
				prop_assert_eq!(&state(&handle), checkpoints.last().expect("initial state kept"));
			}
		}
		while stack.undo() {
			checkpoints.pop();
			prop_assert_eq!(&state(&handle), checkpoints.last().expect("initial state kept"));
		}
		prop_assert_eq!(checkpoints.len(), 1);
	}
}
