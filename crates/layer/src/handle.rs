//! Shared layer handles.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::layer::Layer;

/// Shared, lockable handle to a [`Layer`].
///
/// Access goes through closures so lock guards cannot escape.
#[derive(Clone)]
pub struct LayerHandle(Arc<RwLock<Layer>>);

impl LayerHandle {
	/// Wraps a layer in a new handle.
	pub fn new(layer: Layer) -> Self {
		Self(Arc::new(RwLock::new(layer)))
	}

	/// Runs `f` with read access to the layer.
	pub fn with<R>(&self, f: impl FnOnce(&Layer) -> R) -> R {
		let guard = self.0.read();
		f(&guard)
	}

	/// Runs `f` with write access to the layer.
	///
	/// Blocks if the layer is already locked. Code that may run while the
	/// layer is locked by its caller should use [`try_with_mut`](Self::try_with_mut).
	pub fn with_mut<R>(&self, f: impl FnOnce(&mut Layer) -> R) -> R {
		let mut guard = self.0.write();
		f(&mut guard)
	}

	/// Runs `f` with write access if the layer is not currently locked.
	pub fn try_with_mut<R>(&self, f: impl FnOnce(&mut Layer) -> R) -> Option<R> {
		let mut guard = self.0.try_write()?;
		Some(f(&mut guard))
	}

	/// Returns a weak handle that does not keep the layer alive.
	pub fn downgrade(&self) -> WeakLayer {
		WeakLayer(Arc::downgrade(&self.0))
	}

	/// Returns `true` if both handles refer to the same layer.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl From<Layer> for LayerHandle {
	fn from(layer: Layer) -> Self {
		Self::new(layer)
	}
}

impl fmt::Debug for LayerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0.try_read() {
			Some(layer) => f.debug_tuple("LayerHandle").field(&layer.identifier()).finish(),
			None => f.write_str("LayerHandle(<locked>)"),
		}
	}
}

/// Non-owning counterpart of [`LayerHandle`].
///
/// Undo records hold these so that replaying against a closed layer is a
/// no-op instead of keeping the layer alive.
#[derive(Clone, Default)]
pub struct WeakLayer(Weak<RwLock<Layer>>);

impl WeakLayer {
	/// Returns a handle that never upgrades.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a strong handle if the layer is still alive.
	pub fn upgrade(&self) -> Option<LayerHandle> {
		self.0.upgrade().map(LayerHandle)
	}

	/// Returns `true` if this refers to the layer behind `handle`.
	pub fn is(&self, handle: &LayerHandle) -> bool {
		Weak::ptr_eq(&self.0, &Arc::downgrade(&handle.0))
	}
}

impl fmt::Debug for WeakLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(handle) => f.debug_tuple("WeakLayer").field(&handle).finish(),
			None => f.write_str("WeakLayer(<closed>)"),
		}
	}
}
