//! Undo/redo for layer edits.
//!
//! Edits are captured at the layer's mutation sink rather than diffed after
//! the fact: a [`MutationRecorder`] installed as a layer's state delegate turns
//! every primitive mutation into an [`Instruction`] that knows its exact
//! inverse. Instructions accumulate in an [`InstructionSet`], which a
//! [`TransactionalCommand`] replays forward on redo and backward on undo.
//!
//! # Architecture
//!
//! ```text
//! CommandStack                         Layer
//! ┌──────────────────┐                 ┌─────────────────────────┐
//! │ pending slot     │  do_it()        │ StateDelegate           │
//! │ history[..]      │───────────────► │  └ MutationRecorder ──┐ │
//! │ position         │                 │ LayerData             │ │
//! └──────────────────┘                 └───────────────────────┼─┘
//!          ▲ push_executed                                     │ store
//!          │                                                   ▼
//!   TransactionalCommand ─────────── owns ──────────► InstructionSet
//! ```
//!
//! Recording is scoped: [`InstructionRecorder`], [`MultiLayerRecorder`] and
//! [`UndoRedoRecorder`] install recorders and restore the previously installed
//! delegate when they go out of scope.

pub mod command;
pub mod config;
pub mod error;
pub mod instruction;
pub mod instruction_set;
pub mod recorder;
pub mod scoped;
pub mod stack;

pub use command::{ActionCommand, Command, LayerEditCommand, ReversibleCommand, TransactionalCommand};
pub use config::HistoryConfig;
pub use error::{ConfigError, Result};
pub use instruction::{Instruction, Replay};
pub use instruction_set::{InstructionSet, SharedInstructions};
pub use recorder::MutationRecorder;
pub use scoped::{InstructionRecorder, MultiLayerRecorder, UndoRedoRecorder};
pub use stack::{CommandStack, Pending};
