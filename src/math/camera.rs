use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
	pub position: Vec3,
	pub target: Vec3,
	/// Vertical field of view, in degrees
	pub fov_y: f32,
	pub aspect: f32,
	pub near: f32,
	pub far: f32,
	projection: Mat4,
}

impl Default for PerspectiveCamera {
	fn default() -> Self {
		Self::new(75.0, 1.0, 0.1, 1000.0)
	}
}

impl PerspectiveCamera {
	pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
		let mut camera = Self {
			position: Vec3::ZERO,
			target: Vec3::NEG_Z,
			fov_y,
			aspect,
			near,
			far,
			projection: Mat4::IDENTITY,
		};
		camera.update_projection();
		camera
	}

	/// Sets the aspect ratio and recomputes the projection.
	pub fn set_aspect(&mut self, aspect: f32) {
		self.aspect = aspect;
		self.update_projection();
	}

	/// Must be called after changing any of the projection fields directly.
	pub fn update_projection(&mut self) {
		self.projection = Mat4::perspective_rh_gl(self.fov_y.to_radians(), self.aspect, self.near, self.far);
	}

	pub fn look_at(&mut self, target: Vec3) {
		self.target = target;
	}

	pub fn projection(&self) -> Mat4 {
		self.projection
	}

	pub fn view(&self) -> Mat4 {
		Mat4::look_at_rh(self.position, self.target, Vec3::Y)
	}

	pub fn view_projection(&self) -> Mat4 {
		self.projection * self.view()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aspect_updates_projection() {
		let mut camera = PerspectiveCamera::default();
		let before = camera.projection();
		camera.set_aspect(1920.0 / 1080.0);

		assert_eq!(camera.aspect, 1920.0 / 1080.0);
		assert_ne!(camera.projection(), before);
		assert_eq!(
			camera.projection(),
			Mat4::perspective_rh_gl(75_f32.to_radians(), 1920.0 / 1080.0, 0.1, 1000.0)
		);
	}

	#[test]
	fn target_lands_in_front() {
		let mut camera = PerspectiveCamera::default();
		camera.position = Vec3::new(3.0, 2.0, 8.0);
		camera.look_at(Vec3::new(0.0, 0.0, -5.0));

		let clip = camera.view_projection().project_point3(camera.target);
		assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4, "{clip}");
	}
}
