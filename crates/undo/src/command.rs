//! Undoable commands.
//!
//! A [`Command`] is the unit the [`CommandStack`](crate::CommandStack)
//! retains. `do_it` runs (or re-runs) the command and reports whether it
//! should be kept in history; `undo_it` reverses it and conventionally
//! returns `false`. Redo is the original command's `do_it` again, never the
//! undo of an undo.

use std::fmt;

use tracing::{debug, trace, warn};
use tweak_layer::{Layer, LayerHandle, WeakLayer};

use crate::instruction_set::{InstructionSet, SharedInstructions};
use crate::scoped::InstructionRecorder;

/// An undoable operation.
pub trait Command {
	/// Performs the operation. Returns `true` if it should be retained.
	fn do_it(&mut self) -> bool;

	/// Reverses the operation. Returns `false` by convention.
	fn undo_it(&mut self) -> bool;

	/// Command to append to history in place of this one, if any.
	///
	/// Queried once, right after [`do_it`](Self::do_it) is run from the
	/// pending slot.
	fn take_replacement(&mut self) -> Option<Box<dyn Command>> {
		None
	}

	/// Short description for logs and history listings.
	fn label(&self) -> &str {
		"command"
	}
}

/// Replays a recorded [`InstructionSet`].
#[derive(Clone)]
pub struct TransactionalCommand {
	label: String,
	instructions: SharedInstructions,
}

impl TransactionalCommand {
	/// Creates a command with an empty instruction set.
	pub fn new(label: impl Into<String>) -> Self {
		Self::from_instructions(label, InstructionSet::shared())
	}

	/// Wraps an existing instruction set.
	pub fn from_instructions(label: impl Into<String>, instructions: SharedInstructions) -> Self {
		Self {
			label: label.into(),
			instructions,
		}
	}

	/// The set recorders append into.
	pub fn instructions(&self) -> &SharedInstructions {
		&self.instructions
	}

	/// Returns `true` if nothing has been recorded.
	pub fn is_empty(&self) -> bool {
		self.instructions.lock().is_empty()
	}
}

impl fmt::Debug for TransactionalCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TransactionalCommand")
			.field("label", &self.label)
			.field("instructions", &self.instructions.lock().len())
			.finish()
	}
}

impl Command for TransactionalCommand {
	fn do_it(&mut self) -> bool {
		self.instructions.lock().do_it();
		true
	}

	fn undo_it(&mut self) -> bool {
		self.instructions.lock().undo_it();
		false
	}

	fn label(&self) -> &str {
		&self.label
	}
}

type Action = Box<dyn FnOnce(&mut Layer)>;

/// Runs a closure against a layer once, recording everything it does.
///
/// The command itself is never retained. The recorded edits are handed to the
/// stack as a [`TransactionalCommand`] through
/// [`take_replacement`](Command::take_replacement).
pub struct ActionCommand {
	layer: WeakLayer,
	label: String,
	action: Option<Action>,
	replacement: Option<TransactionalCommand>,
}

impl ActionCommand {
	pub fn new(layer: &LayerHandle, label: impl Into<String>, action: impl FnOnce(&mut Layer) + 'static) -> Self {
		Self {
			layer: layer.downgrade(),
			label: label.into(),
			action: Some(Box::new(action)),
			replacement: None,
		}
	}
}

impl fmt::Debug for ActionCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActionCommand")
			.field("label", &self.label)
			.field("layer", &self.layer)
			.field("ran", &self.action.is_none())
			.finish()
	}
}

impl Command for ActionCommand {
	fn do_it(&mut self) -> bool {
		let Some(action) = self.action.take() else {
			trace!(label = %self.label, "action already ran");
			return false;
		};
		let Some(handle) = self.layer.upgrade() else {
			debug!(label = %self.label, "action skipped: layer closed");
			return false;
		};

		let command = TransactionalCommand::new(self.label.clone());
		{
			let _recording = InstructionRecorder::new(command.instructions(), &handle);
			if handle.try_with_mut(action).is_none() {
				warn!(label = %self.label, "action skipped: layer is locked");
			}
		}

		if command.is_empty() {
			debug!(label = %self.label, "action changed nothing");
		} else {
			trace!(
				label = %self.label,
				instructions = command.instructions().lock().len(),
				"action recorded"
			);
			self.replacement = Some(command);
		}
		false
	}

	fn undo_it(&mut self) -> bool {
		false
	}

	fn take_replacement(&mut self) -> Option<Box<dyn Command>> {
		self.replacement
			.take()
			.map(|command| Box::new(command) as Box<dyn Command>)
	}

	fn label(&self) -> &str {
		&self.label
	}
}

/// A layer edit that is recorded on first run and re-run on redo.
///
/// Undo replays the recorded inverse. Redo runs the edit again with no
/// recorder installed, since the set already holds the first recording.
pub struct LayerEditCommand {
	layer: WeakLayer,
	label: String,
	edit: Box<dyn FnMut(&mut Layer)>,
	instructions: SharedInstructions,
}

impl LayerEditCommand {
	pub fn new(layer: &LayerHandle, label: impl Into<String>, edit: impl FnMut(&mut Layer) + 'static) -> Self {
		Self {
			layer: layer.downgrade(),
			label: label.into(),
			edit: Box::new(edit),
			instructions: InstructionSet::shared(),
		}
	}
}

impl fmt::Debug for LayerEditCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LayerEditCommand")
			.field("label", &self.label)
			.field("layer", &self.layer)
			.field("instructions", &self.instructions.lock().len())
			.finish_non_exhaustive()
	}
}

impl Command for LayerEditCommand {
	fn do_it(&mut self) -> bool {
		let Some(handle) = self.layer.upgrade() else {
			debug!(label = %self.label, "edit skipped: layer closed");
			return false;
		};
		{
			let _recording = InstructionRecorder::new(&self.instructions, &handle);
			let edit = &mut self.edit;
			if handle.try_with_mut(|layer| edit(layer)).is_none() {
				warn!(label = %self.label, "edit skipped: layer is locked");
			}
		}
		// Nothing recorded means nothing to undo.
		!self.instructions.lock().is_empty()
	}

	fn undo_it(&mut self) -> bool {
		self.instructions.lock().undo_it();
		false
	}

	fn label(&self) -> &str {
		&self.label
	}
}

/// UI-state command built from a forward and a backward closure.
///
/// Touches no layer; always retained.
pub struct ReversibleCommand {
	label: String,
	forward: Box<dyn FnMut()>,
	backward: Box<dyn FnMut()>,
}

impl ReversibleCommand {
	pub fn new(
		label: impl Into<String>,
		forward: impl FnMut() + 'static,
		backward: impl FnMut() + 'static,
	) -> Self {
		Self {
			label: label.into(),
			forward: Box::new(forward),
			backward: Box::new(backward),
		}
	}
}

impl fmt::Debug for ReversibleCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReversibleCommand")
			.field("label", &self.label)
			.finish_non_exhaustive()
	}
}

impl Command for ReversibleCommand {
	fn do_it(&mut self) -> bool {
		(self.forward)();
		true
	}

	fn undo_it(&mut self) -> bool {
		(self.backward)();
		false
	}

	fn label(&self) -> &str {
		&self.label
	}
}
