use glam::Mat4;

use crate::math::camera::PerspectiveCamera;
use crate::node::{NodeUuid, Part};
use crate::scene::Scene;

/// Backend for drawing the scene. Bring your own, or use `RenderlessRenderer` / `OpenglRenderer`.
pub trait CapRenderer {
	type Error: std::error::Error + 'static;

	/// Called with the new surface size, in pixels.
	fn resize(&mut self, width: u32, height: u32);

	/// Clear the surface and take the camera for this frame.
	fn begin_frame(&mut self, camera: &PerspectiveCamera) -> Result<(), Self::Error>;

	/// Draw one part with its absolute transform.
	fn draw_part(&mut self, id: NodeUuid, part: &Part, world: &Mat4) -> Result<(), Self::Error>;

	/// Present the frame.
	fn end_frame(&mut self) -> Result<(), Self::Error>;
}

/// Dispatches draw calls for all visible parts of `scene`, parents before children.
///
/// Parts under a hidden group are skipped. Returns the number of parts drawn.
/// The first backend error aborts the frame.
pub fn draw<R: CapRenderer + ?Sized>(renderer: &mut R, scene: &Scene) -> Result<usize, R::Error> {
	renderer.begin_frame(&scene.camera)?;

	let mut drawn = 0;
	scene.model.tree.visit_visible_parts(|node, part, world| {
		drawn += 1;
		renderer.draw_part(node.uuid, part, world)
	})?;

	renderer.end_frame()?;
	Ok(drawn)
}
