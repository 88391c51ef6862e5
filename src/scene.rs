mod transforms;
mod tree;

pub use tree::SceneTree;

use crate::math::camera::PerspectiveCamera;
use crate::model::CapModel;

/// Everything the drivers mutate and the renderer reads: the cap and the camera.
///
/// Passed explicitly by `&mut` to the idle animator and the scroll timeline.
/// Only the draw call reads it.
pub struct Scene {
	pub model: CapModel,
	pub camera: PerspectiveCamera,
}

impl Scene {
	pub fn new(model: CapModel, camera: PerspectiveCamera) -> Self {
		Self { model, camera }
	}
}
