//! Command stack behavior against real layer edits.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tweak_layer::{Layer, LayerHandle};
use tweak_primitives::{SpecPath, SpecType, Value, fields};
use tweak_undo::{
	CommandStack, HistoryConfig, InstructionRecorder, LayerEditCommand, Replay, TransactionalCommand,
};

use crate::common::{path, scene, state};

fn transact(
	stack: &mut CommandStack,
	handle: &LayerHandle,
	label: &str,
	edit: impl FnOnce(&mut Layer) + 'static,
) {
	assert!(stack.wrap_as_transaction(handle, label, edit));
	assert!(stack.process_pending());
}

#[test]
fn undo_then_redo_is_identity_at_every_step() {
	let handle = scene();
	let mut stack = CommandStack::new();
	transact(&mut stack, &handle, "rename", |layer| {
		layer.rename_prim(&path("/World/Cube"), "Box").expect("rename");
	});
	transact(&mut stack, &handle, "retime", |layer| {
		layer.erase_time_sample(&path("/World/Box.size"), 1.0);
		layer.set_time_sample(&path("/World/Box.size"), 12.0, 3.0);
	});
	transact(&mut stack, &handle, "remove light", |layer| {
		layer.remove_prim(&path("/World/Light")).expect("remove");
	});

	while stack.can_undo() {
		let before = state(&handle);
		stack.undo();
		stack.redo();
		assert_eq!(state(&handle), before);
		stack.undo();
	}
}

#[test]
fn each_transaction_round_trips() {
	let handle = scene();
	let mut stack = CommandStack::new();
	let edits: Vec<(&str, Box<dyn FnOnce(&mut Layer)>)> = vec![
		(
			"metadata",
			Box::new(|layer: &mut Layer| {
				let cube = path("/World/Cube");
				layer.set_field_dict_value_by_key(&cube, fields::CUSTOM_DATA, "author:team", "fx");
				layer.erase_field_dict_value_by_key(&cube, fields::CUSTOM_DATA, "author:name");
			}),
		),
		(
			"add prim",
			Box::new(|layer: &mut Layer| {
				let cam = layer.define_prim(&path("/World"), "Camera", "Camera").expect("define");
				layer.define_attribute(&cam, "focalLength", 35.0).expect("attr");
			}),
		),
		(
			"reparent",
			Box::new(|layer: &mut Layer| {
				layer.move_spec(&path("/World/Light"), &path("/Light"));
				layer.push_child(&SpecPath::root(), fields::PRIM_CHILDREN, Value::token("Light"));
			}),
		),
	];

	for (label, edit) in edits {
		let before = state(&handle);
		transact(&mut stack, &handle, label, edit);
		let after = state(&handle);
		assert_ne!(before, after, "{label} changed nothing");

		stack.undo();
		assert_eq!(state(&handle), before, "{label} undo");
		stack.redo();
		assert_eq!(state(&handle), after, "{label} redo");
	}
}

#[test]
fn undo_must_run_in_reverse() {
	let handle = scene();
	let before = state(&handle);
	let command = TransactionalCommand::new("dependent edits");
	{
		let _recording = InstructionRecorder::new(command.instructions(), &handle);
		handle.with_mut(|layer| {
			layer.set_field(&path("/World"), "counter", 1i64);
			layer.set_field(&path("/World"), "counter", 2i64);
		});
	}

	let recorded: Vec<_> = command.instructions().lock().iter().cloned().collect();
	assert_eq!(recorded.len(), 2);
	for instruction in &recorded {
		instruction.undo_it();
	}
	assert_ne!(state(&handle), before);

	for instruction in &recorded {
		instruction.do_it();
	}
	command.instructions().lock().undo_it();
	assert_eq!(state(&handle), before);
}

#[test]
fn dependent_edits_replay_in_order() {
	let handle = scene();
	let before = state(&handle);
	let command = TransactionalCommand::new("add and tag");
	{
		let _recording = InstructionRecorder::new(command.instructions(), &handle);
		handle.with_mut(|layer| {
			layer.create_spec(&path("/World/Extra"), SpecType::Prim, false);
			layer.set_field(&path("/World/Extra"), "weight", 3i64);
		});
	}
	let after = state(&handle);
	let recorded: Vec<_> = command.instructions().lock().iter().cloned().collect();
	assert_eq!(recorded.iter().map(|i| i.kind()).collect::<Vec<_>>(), ["CreateSpec", "SetField"]);

	command.instructions().lock().undo_it();
	assert_eq!(state(&handle), before);

	// The field cannot land before its spec exists.
	for instruction in recorded.iter().rev() {
		instruction.do_it();
	}
	assert_ne!(state(&handle), after);
	assert_eq!(
		handle.with(|layer| layer.data().get_field(&path("/World/Extra"), "weight").cloned()),
		None
	);

	command.instructions().lock().undo_it();
	assert_eq!(state(&handle), before);
	command.instructions().lock().do_it();
	assert_eq!(state(&handle), after);
}

#[test]
fn move_onto_occupied_subtree_is_refused() {
	let handle = scene();
	let mut stack = CommandStack::new();
	transact(&mut stack, &handle, "rig", |layer| {
		let rig = layer.define_prim(&SpecPath::root(), "Rig", "Xform").expect("define");
		let cube = layer.define_prim(&rig, "Cube", "Mesh").expect("define");
		layer.set_field(&cube, "tag", Value::token("kept"));
	});
	let before = state(&handle);

	transact(&mut stack, &handle, "clobber", |layer| {
		layer.move_spec(&path("/World"), &path("/Rig"));
		layer.move_spec(&path("/World/Cube"), &path("/Rig/Cube"));
	});
	assert_eq!(stack.labels(), ["rig"]);
	assert_eq!(state(&handle), before);
	assert_eq!(
		handle.with(|layer| layer.data().get_field(&path("/Rig/Cube"), "tag").cloned()),
		Some(Value::token("kept"))
	);
}

#[test]
fn missing_parent_blocks_define_and_move() {
	let handle = scene();
	let mut stack = CommandStack::new();
	let before = state(&handle);
	let count = handle.with(|layer| layer.data().spec_count());

	transact(&mut stack, &handle, "strays", |layer| {
		layer.create_spec(&path("/B/C"), SpecType::Prim, false);
		assert!(layer.define_prim(&path("/B"), "C", "Xform").is_err());
		layer.move_spec(&path("/World/Light"), &path("/B/Light"));
	});
	assert!(stack.is_empty());
	assert_eq!(state(&handle), before);

	// With no stray below the destination, the move round-trips.
	transact(&mut stack, &handle, "move", |layer| {
		layer.move_spec(&path("/World"), &path("/B"));
	});
	assert!(handle.with(|layer| layer.data().has_spec(&path("/B/Cube.size"))));
	assert!(stack.undo());
	assert_eq!(state(&handle), before);
	assert_eq!(handle.with(|layer| layer.data().spec_count()), count);
}

#[test]
fn locked_layer_turns_edits_into_no_ops() {
	let handle = scene();
	let before = state(&handle);
	let mut stack = CommandStack::new();
	let edit = LayerEditCommand::new(&handle, "hide", |layer: &mut Layer| {
		layer.set_field(&path("/World"), "visible", false);
	});

	handle.with(|_| {
		assert!(stack.wrap_as_transaction(&handle, "deactivate", |layer| {
			layer.set_field(&path("/World"), "active", false);
		}));
		assert!(stack.process_pending());
		assert!(stack.submit(edit));
		assert!(stack.process_pending());
	});
	assert!(stack.is_empty());
	assert_eq!(state(&handle), before);
	assert!(!handle.with(|layer| layer.is_dirty()));
}

#[test]
fn new_edit_after_undo_drops_redo() {
	let handle = scene();
	let mut stack = CommandStack::new();
	for name in ["A", "B", "C"] {
		transact(&mut stack, &handle, name, move |layer| {
			layer.define_prim(&SpecPath::root(), name, "").expect("define");
		});
	}
	stack.undo();
	stack.undo();
	assert_eq!(stack.position(), 1);

	transact(&mut stack, &handle, "D", |layer| {
		layer.define_prim(&SpecPath::root(), "D", "").expect("define");
	});
	assert_eq!(stack.labels(), ["A", "D"]);
	assert_eq!(stack.position(), 2);

	let before = state(&handle);
	assert!(!stack.redo());
	assert_eq!(state(&handle), before);
	assert!(!handle.with(|layer| layer.data().has_spec(&path("/B"))));
}

#[test]
fn only_first_submission_per_cycle_runs() {
	let handle = scene();
	let mut stack = CommandStack::new();
	assert!(stack.wrap_as_transaction(&handle, "first", |layer| {
		layer.set_field(&path("/World"), "active", false);
	}));
	assert!(!stack.wrap_as_transaction(&handle, "second", |layer| {
		layer.remove_prim(&path("/World")).expect("remove");
	}));
	assert!(!stack.submit_undo());

	stack.process_pending();
	assert!(!stack.process_pending());
	assert_eq!(stack.labels(), ["first"]);
	assert!(handle.with(|layer| layer.data().has_spec(&path("/World"))));
}

#[test]
fn dirty_listener_fires_once_per_clean_period() {
	let handle = scene();
	let notified = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&notified);
	handle.with_mut(|layer| {
		layer.on_dirty(move |_| {
			seen.fetch_add(1, Ordering::SeqCst);
		})
	});

	let mut stack = CommandStack::new();
	transact(&mut stack, &handle, "many edits", |layer| {
		for i in 0..5i64 {
			layer.set_field(&path("/World"), "counter", i);
		}
		layer.define_prim(&path("/World"), "Extra", "").expect("define");
	});
	assert_eq!(notified.load(Ordering::SeqCst), 1);
	assert!(handle.with(|layer| layer.is_dirty()));

	stack.undo();
	stack.redo();
	assert_eq!(notified.load(Ordering::SeqCst), 1);

	handle.with_mut(|layer| layer.mark_clean());
	stack.undo();
	stack.redo();
	assert_eq!(notified.load(Ordering::SeqCst), 2);
}

#[test]
fn history_limit_applies_to_recorded_transactions() {
	let handle = scene();
	let config = HistoryConfig::from_toml_str("max_depth = 2").expect("config");
	let mut stack = CommandStack::with_config(config);
	for i in 0..4i64 {
		transact(&mut stack, &handle, "count", move |layer| {
			layer.set_field(&path("/World"), "counter", i);
		});
	}
	assert_eq!(stack.len(), 2);
	while stack.undo() {}
	assert_eq!(
		handle.with(|layer| layer.data().get_field(&path("/World"), "counter").cloned()),
		Some(Value::Int(1))
	);
}
