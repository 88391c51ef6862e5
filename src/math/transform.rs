use glam::{EulerRot, Mat4, Quat, Vec3};

/// Transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
	/// X Y Z
	pub translation: Vec3,
	/// Euler angles, applied in XYZ order
	pub rotation: Vec3,
	/// X Y Z scale
	pub scale: Vec3,
}

impl Default for Transform {
	fn default() -> Self {
		Self {
			translation: Vec3::ZERO,
			rotation: Vec3::ZERO,
			scale: Vec3::ONE,
		}
	}
}

impl Transform {
	pub fn from_translation(translation: Vec3) -> Self {
		Self {
			translation,
			..Default::default()
		}
	}

	pub fn with_rotation(mut self, rotation: Vec3) -> Self {
		self.rotation = rotation;
		self
	}

	pub fn with_scale(mut self, scale: Vec3) -> Self {
		self.scale = scale;
		self
	}

	/// Sets the same scale factor on all three axes.
	pub fn set_uniform_scale(&mut self, scale: f32) {
		self.scale = Vec3::splat(scale);
	}

	pub fn to_matrix(&self) -> Mat4 {
		Mat4::from_scale_rotation_translation(
			self.scale,
			Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
			self.translation,
		)
	}
}
