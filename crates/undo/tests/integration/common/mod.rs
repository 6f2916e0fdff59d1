//! Common fixtures for undo integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tweak_layer::{Layer, LayerData, LayerHandle, SimpleStateDelegate, StateDelegate, SubtreeSnapshot};
use tweak_primitives::{SpecPath, SpecType, TimeCode, Value, fields};

/// Installs a global fmt subscriber once per test binary.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

pub fn path(s: &str) -> SpecPath {
	SpecPath::parse(s).expect("valid test path")
}

/// Complete observable state of a layer.
pub fn state(handle: &LayerHandle) -> SubtreeSnapshot {
	handle.with(|layer| layer.data().snapshot_subtree(&SpecPath::root()))
}

/// A small scene: `/World` with a mesh, a light, and some metadata.
pub fn scene() -> LayerHandle {
	init_tracing();
	let mut layer = Layer::new("scene.usda");
	let root = SpecPath::root();
	let world = layer.define_prim(&root, "World", "Xform").expect("define World");
	let cube = layer.define_prim(&world, "Cube", "Mesh").expect("define Cube");
	layer.define_attribute(&cube, "size", 2.0).expect("define size");
	layer.set_time_sample(&path("/World/Cube.size"), 1.0, 2.5);
	layer.set_time_sample(&path("/World/Cube.size"), 24.0, 4.0);
	layer.set_field_dict_value_by_key(&cube, fields::CUSTOM_DATA, "author:name", "ada");
	layer.define_prim(&world, "Light", "SphereLight").expect("define Light");
	layer.mark_clean();
	LayerHandle::new(layer)
}

/// Delegate that counts the edits it applies.
///
/// Lets tests tell which delegate is installed by which counter moves.
#[derive(Debug, Default)]
pub struct CountingDelegate {
	inner: SimpleStateDelegate,
	edits: Arc<AtomicUsize>,
}

impl CountingDelegate {
	pub fn new() -> (Self, Arc<AtomicUsize>) {
		let edits = Arc::new(AtomicUsize::new(0));
		let delegate = Self {
			inner: SimpleStateDelegate::new(),
			edits: Arc::clone(&edits),
		};
		(delegate, edits)
	}

	fn count(&self) {
		self.edits.fetch_add(1, Ordering::SeqCst);
	}
}

impl StateDelegate for CountingDelegate {
	fn is_dirty(&self) -> bool {
		self.inner.is_dirty()
	}

	fn set_dirty(&mut self, dirty: bool) {
		self.inner.set_dirty(dirty);
	}

	fn set_field(&mut self, data: &mut LayerData, path: &SpecPath, field: &str, value: Option<Value>) {
		self.count();
		self.inner.set_field(data, path, field, value);
	}

	fn set_field_dict_value_by_key(
		&mut self,
		data: &mut LayerData,
		path: &SpecPath,
		field: &str,
		key_path: &str,
		value: Option<Value>,
	) {
		self.count();
		self.inner.set_field_dict_value_by_key(data, path, field, key_path, value);
	}

	fn set_time_sample(&mut self, data: &mut LayerData, path: &SpecPath, time: TimeCode, value: Option<Value>) {
		self.count();
		self.inner.set_time_sample(data, path, time, value);
	}

	fn create_spec(&mut self, data: &mut LayerData, path: &SpecPath, spec_type: SpecType, inert: bool) {
		self.count();
		self.inner.create_spec(data, path, spec_type, inert);
	}

	fn delete_spec(&mut self, data: &mut LayerData, path: &SpecPath, inert: bool) {
		self.count();
		self.inner.delete_spec(data, path, inert);
	}

	fn move_spec(&mut self, data: &mut LayerData, old: &SpecPath, new: &SpecPath) {
		self.count();
		self.inner.move_spec(data, old, new);
	}

	fn push_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, value: Value) {
		self.count();
		self.inner.push_child(data, parent, field, value);
	}

	fn pop_child(&mut self, data: &mut LayerData, parent: &SpecPath, field: &str, old_value: &Value) {
		self.count();
		self.inner.pop_child(data, parent, field, old_value);
	}
}
