//! Ordered collections of recorded instructions.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::instruction::{Instruction, Replay};

/// Instruction set shared between the command that owns it and the recorder
/// filling it.
pub type SharedInstructions = Arc<Mutex<InstructionSet>>;

/// Instructions in the order they were recorded.
///
/// [`do_it`](Self::do_it) replays them first to last; [`undo_it`](Self::undo_it)
/// inverts them last to first.
#[derive(Debug, Default)]
pub struct InstructionSet {
	instructions: Vec<Instruction>,
}

impl InstructionSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty set behind a shared handle.
	pub fn shared() -> SharedInstructions {
		Arc::new(Mutex::new(Self::new()))
	}

	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	pub fn clear(&mut self) {
		self.instructions.clear();
	}

	/// Appends an instruction.
	pub fn store_instruction(&mut self, instruction: impl Into<Instruction>) {
		let instruction = instruction.into();
		trace!(kind = instruction.kind(), index = self.instructions.len(), "instruction stored");
		self.instructions.push(instruction);
	}

	/// Iterates over the instructions in recording order.
	pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
		self.instructions.iter()
	}

	/// Replays every instruction in recording order.
	pub fn do_it(&self) {
		trace!(count = self.instructions.len(), "instruction set redo");
		for instruction in &self.instructions {
			instruction.do_it();
		}
	}

	/// Inverts every instruction in reverse recording order.
	pub fn undo_it(&self) {
		trace!(count = self.instructions.len(), "instruction set undo");
		for instruction in self.instructions.iter().rev() {
			instruction.undo_it();
		}
	}
}
