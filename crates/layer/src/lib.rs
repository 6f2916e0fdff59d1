//! Scene description layers.
//!
//! A [`Layer`] stores hierarchical specs keyed by [`SpecPath`]. Every edit
//! goes through the layer's installed [`StateDelegate`], which decides how a
//! primitive mutation reaches the raw [`LayerData`] storage. The default
//! [`SimpleStateDelegate`] applies edits directly; other delegates can
//! observe or record them first.
//!
//! # Architecture
//!
//! ```text
//! Layer::set_field ──► StateDelegate::set_field ──► LayerData::prim_set_field
//!                     (installed, swappable)        (raw storage)
//! ```
//!
//! [`SpecPath`]: tweak_primitives::SpecPath

pub mod data;
pub mod delegate;
pub mod error;
pub mod handle;
pub mod layer;

pub use data::{LayerData, Spec, SubtreeSnapshot};
pub use delegate::{DirtyState, SimpleStateDelegate, StateDelegate};
pub use error::{LayerError, Result};
pub use handle::{LayerHandle, WeakLayer};
pub use layer::Layer;
