//! Command history with a single pending slot.
//!
//! # Architecture
//!
//! ```text
//!  UI event ──submit()──► pending (first wins)
//!                             │ process_pending()
//!                             ▼
//!            do_it() ── true ──► push_executed() ──► history[..position]
//!                  └─ replacement ─┘
//!
//!  history: [ c0 | c1 | c2 | c3 ]
//!                        ▲ position: undo() steps left, redo() steps right
//! ```
//!
//! The stack is an explicit context object; there is one per editing
//! session and no global instance.

use std::fmt;

use tracing::{debug, trace};
use tweak_layer::{Layer, LayerHandle};

use crate::command::{ActionCommand, Command};
use crate::config::HistoryConfig;
use crate::scoped::UndoRedoRecorder;


/// Work waiting for the next [`CommandStack::process_pending`].
pub enum Pending {
	/// Run a command and retain it if it asks to be kept.
	Execute(Box<dyn Command>),
	Undo,
	Redo,
	Clear,
}

impl Pending {
	fn describe(&self) -> &str {
		match self {
			Self::Execute(command) => command.label(),
			Self::Undo => "undo",
			Self::Redo => "redo",
			Self::Clear => "clear",
		}
	}
}

impl fmt::Debug for Pending {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Execute(command) => f.debug_tuple("Execute").field(&command.label()).finish(),
			Self::Undo => f.write_str("Undo"),
			Self::Redo => f.write_str("Redo"),
			Self::Clear => f.write_str("Clear"),
		}
	}
}

/// Linear undo history.
///
/// Invariant: `position <= history.len()`. Commands before `position` are
/// done; commands from `position` on have been undone and can be redone until
/// a new command is pushed.
#[derive(Default)]
pub struct CommandStack {
	history: Vec<Box<dyn Command>>,
	position: usize,
	pending: Option<Pending>,
	config: HistoryConfig,
}

impl fmt::Debug for CommandStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandStack")
			.field("history", &self.labels())
			.field("position", &self.position)
			.field("pending", &self.pending)
			.field("config", &self.config)
			.finish()
	}
}

impl CommandStack {
	/// Creates an empty stack with unlimited history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty stack with the given settings.
	pub fn with_config(config: HistoryConfig) -> Self {
		Self {
			history: Vec::new(),
			position: 0,
			pending: None,
			config,
		}
	}

	pub fn config(&self) -> &HistoryConfig {
		&self.config
	}

	/// Number of retained commands, done or undone.
	pub fn len(&self) -> usize {
		self.history.len()
	}

	pub fn is_empty(&self) -> bool {
		self.history.is_empty()
	}

	/// Number of commands currently applied.
	pub fn position(&self) -> usize {
		self.position
	}

	pub fn can_undo(&self) -> bool {
		self.position > 0
	}

	pub fn can_redo(&self) -> bool {
		self.position < self.history.len()
	}

	pub fn has_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Labels of all retained commands, oldest first.
	pub fn labels(&self) -> Vec<&str> {
		self.history.iter().map(|command| command.label()).collect()
	}

	/// Queues `command` for the next [`process_pending`](Self::process_pending).
	///
	/// Returns `false` and drops `command` if something is already pending.
	pub fn submit(&mut self, command: impl Command + 'static) -> bool {
		self.submit_boxed(Box::new(command))
	}

	pub fn submit_boxed(&mut self, command: Box<dyn Command>) -> bool {
		self.set_pending(Pending::Execute(command))
	}

	/// Queues an undo step.
	pub fn submit_undo(&mut self) -> bool {
		self.set_pending(Pending::Undo)
	}

	/// Queues a redo step.
	pub fn submit_redo(&mut self) -> bool {
		self.set_pending(Pending::Redo)
	}

	/// Queues a history reset.
	pub fn submit_clear(&mut self) -> bool {
		self.set_pending(Pending::Clear)
	}

	/// Queues `action` to run against `layer` as a single undoable step.
	pub fn wrap_as_transaction(
		&mut self,
		layer: &LayerHandle,
		label: impl Into<String>,
		action: impl FnOnce(&mut Layer) + 'static,
	) -> bool {
		self.submit(ActionCommand::new(layer, label, action))
	}

	fn set_pending(&mut self, pending: Pending) -> bool {
		if let Some(current) = &self.pending {
			debug!(
				pending = current.describe(),
				dropped = pending.describe(),
				"command dropped: another command is pending"
			);
			return false;
		}
		trace!(pending = pending.describe(), "command submitted");
		self.pending = Some(pending);
		true
	}

	/// Runs the pending entry, if any. Returns `true` if something ran.
	pub fn process_pending(&mut self) -> bool {
		let Some(pending) = self.pending.take() else {
			return false;
		};
		match pending {
			Pending::Execute(command) => self.execute(command),
			Pending::Undo => {
				self.undo();
			}
			Pending::Redo => {
				self.redo();
			}
			Pending::Clear => self.clear(),
		}
		true
	}

	fn execute(&mut self, mut command: Box<dyn Command>) {
		let keep = command.do_it();
		if let Some(replacement) = command.take_replacement() {
			self.push_executed(replacement);
		}
		if keep {
			self.push_executed(command);
		} else {
			trace!(label = command.label(), "command discarded");
		}
	}

	/// Appends a command whose effects are already applied.
	///
	/// Any undone commands after `position` are discarded first. The oldest
	/// commands are dropped when the history limit is exceeded.
	pub fn push_executed(&mut self, command: Box<dyn Command>) {
		if self.history.len() > self.position {
			trace!(cleared = self.history.len() - self.position, "redo history cleared");
		}
		self.history.truncate(self.position);
		trace!(label = command.label(), position = self.position + 1, "command pushed");
		self.history.push(command);
		self.position = self.history.len();

		if let Some(max) = self.config.max_depth {
			let excess = self.history.len().saturating_sub(max);
			if excess > 0 {
				self.history.drain(..excess);
				self.position = self.position.saturating_sub(excess);
				debug!(dropped = excess, max_depth = max, "oldest commands dropped");
			}
		}
	}

	/// Undoes the command before `position`. Returns `false` if there is none.
	///
	/// The cursor moves even when the command's replay is skipped because its
	/// layer is closed or locked; such a layer is left as it was.
	pub fn undo(&mut self) -> bool {
		if self.position == 0 {
			trace!("undo: nothing to undo");
			return false;
		}
		let Some(command) = self.history.get_mut(self.position - 1) else {
			return false;
		};
		self.position -= 1;
		trace!(label = command.label(), position = self.position, "undo");
		command.undo_it();
		true
	}

	/// Redoes the command at `position`. Returns `false` if there is none.
	///
	/// As with [`undo`](Self::undo), a skipped replay still moves the cursor.
	pub fn redo(&mut self) -> bool {
		let Some(command) = self.history.get_mut(self.position) else {
			trace!("redo: nothing to redo");
			return false;
		};
		trace!(label = command.label(), position = self.position + 1, "redo");
		command.do_it();
		self.position += 1;
		true
	}

	/// Drops all history and any pending entry.
	pub fn clear(&mut self) {
		debug!(commands = self.history.len(), "command history cleared");
		self.history.clear();
		self.position = 0;
		self.pending = None;
	}

	/// Starts recording edits to `layer` into a new history entry.
	///
	/// The entry is pushed when the returned guard stops recording or drops.
	pub fn record(&mut self, layer: &LayerHandle, label: impl Into<String>) -> UndoRedoRecorder<'_> {
		let mut recorder = UndoRedoRecorder::new(self, layer, label);
		recorder.start_recording();
		recorder
	}
}

impl Drop for CommandStack {
	fn drop(&mut self) {
		if !self.history.is_empty() || self.pending.is_some() {
			debug!(
				commands = self.history.len(),
				pending = self.pending.is_some(),
				"command stack dropped"
			);
		}
	}
}
