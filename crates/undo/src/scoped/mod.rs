//! Scoped recorder installation.
//!
//! Each guard installs a [`MutationRecorder`] on one or more layers and puts
//! back exactly the delegate it displaced when it goes out of scope. Every
//! install is paired with one restore; a guard that installed nothing
//! restores nothing.
//!
//! Installing never blocks. A layer that is locked when the guard is opened
//! (for instance by the caller itself) is skipped with a warning and the
//! guard records nothing for it.

use tracing::{trace, warn};
use tweak_layer::{LayerHandle, StateDelegate};

use crate::command::TransactionalCommand;
use crate::instruction_set::SharedInstructions;
use crate::recorder::MutationRecorder;
use crate::stack::CommandStack;


/// A recorder installed on a layer, holding the delegate it displaced.
struct Installed {
	layer: LayerHandle,
	previous: Box<dyn StateDelegate>,
}

impl Installed {
	/// Installs a recorder bound to `instructions`.
	///
	/// Returns `None` without waiting if `layer` is locked.
	fn install(instructions: &SharedInstructions, layer: &LayerHandle) -> Option<Self> {
		let recorder = MutationRecorder::new(instructions.clone(), layer);
		let Some(previous) = layer.try_with_mut(|l| l.set_state_delegate(Box::new(recorder))) else {
			warn!(?layer, "recording skipped: layer is locked");
			return None;
		};
		trace!(?layer, "recorder installed");
		Some(Self {
			layer: layer.clone(),
			previous,
		})
	}

	/// Puts the displaced delegate back, waiting for the layer lock.
	fn restore(self) {
		let Self { layer, previous } = self;
		layer.with_mut(|l| l.set_state_delegate(previous));
		trace!(?layer, "previous delegate restored");
	}
}

/// Records edits to one layer into one instruction set for its lifetime.
///
/// Installs only if the set is empty. A guard opened while the set already
/// holds instructions is part of an ongoing recording and does nothing.
#[must_use = "recording stops when the guard is dropped"]
pub struct InstructionRecorder {
	installed: Option<Installed>,
}

impl InstructionRecorder {
	pub fn new(instructions: &SharedInstructions, layer: &LayerHandle) -> Self {
		if !instructions.lock().is_empty() {
			trace!(?layer, "recording in progress; nested guard is inert");
			return Self { installed: None };
		}
		Self {
			installed: Installed::install(instructions, layer),
		}
	}

	/// Returns `true` if this guard installed a recorder.
	pub fn is_installed(&self) -> bool {
		self.installed.is_some()
	}
}

impl Drop for InstructionRecorder {
	fn drop(&mut self) {
		if let Some(installed) = self.installed.take() {
			installed.restore();
		}
	}
}

/// Records edits to several layers into one instruction set.
///
/// `None` entries are skipped. Previous delegates are kept in a vector
/// parallel to the layer list and restored in reverse order, so a layer
/// listed twice still ends up with its original delegate.
#[must_use = "recording stops when the guard is dropped"]
pub struct MultiLayerRecorder {
	installed: Vec<Option<Installed>>,
}

impl MultiLayerRecorder {
	pub fn new(instructions: &SharedInstructions, layers: &[Option<LayerHandle>]) -> Self {
		if !instructions.lock().is_empty() {
			trace!(layers = layers.len(), "recording in progress; nested guard is inert");
			return Self { installed: Vec::new() };
		}
		let installed = layers
			.iter()
			.map(|layer| layer.as_ref().and_then(|handle| Installed::install(instructions, handle)))
			.collect();
		Self { installed }
	}

	/// Number of layers this guard installed a recorder on.
	pub fn installed_count(&self) -> usize {
		self.installed.iter().flatten().count()
	}
}

impl Drop for MultiLayerRecorder {
	fn drop(&mut self) {
		for installed in self.installed.drain(..).rev().flatten() {
			installed.restore();
		}
	}
}

/// Records edits to a layer and pushes them onto a [`CommandStack`].
///
/// Recording is started and stopped explicitly. Stopping restores the
/// previous delegate and pushes the recorded [`TransactionalCommand`] straight
/// into history, since its edits have already been applied. A guard dropped
/// while recording stops itself.
pub struct UndoRedoRecorder<'s> {
	stack: &'s mut CommandStack,
	layer: LayerHandle,
	label: String,
	command: Option<TransactionalCommand>,
	installed: Option<Installed>,
}

impl<'s> UndoRedoRecorder<'s> {
	/// Creates an idle recorder.
	pub fn new(stack: &'s mut CommandStack, layer: &LayerHandle, label: impl Into<String>) -> Self {
		Self {
			stack,
			layer: layer.clone(),
			label: label.into(),
			command: None,
			installed: None,
		}
	}

	/// Starts a new recording. An ongoing recording is stopped (and pushed)
	/// first.
	///
	/// Returns `false` and stays idle if the layer is locked.
	pub fn start_recording(&mut self) -> bool {
		if self.is_recording() {
			self.stop_recording();
		}
		let command = TransactionalCommand::new(self.label.clone());
		self.installed = Installed::install(command.instructions(), &self.layer);
		if self.installed.is_some() {
			self.command = Some(command);
		}
		self.is_recording()
	}

	/// Stops recording and pushes the recorded command. No-op when idle.
	pub fn stop_recording(&mut self) {
		let Some(installed) = self.installed.take() else {
			return;
		};
		installed.restore();
		if let Some(command) = self.command.take() {
			self.stack.push_executed(Box::new(command));
		}
	}

	pub fn is_recording(&self) -> bool {
		self.installed.is_some()
	}
}

impl Drop for UndoRedoRecorder<'_> {
	fn drop(&mut self) {
		self.stop_recording();
	}
}
