use glam::Vec3;

use crate::math::transform::Transform;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub struct NodeUuid(pub(crate) u32);

impl NodeUuid {
	pub fn raw(self) -> u32 {
		self.0
	}
}

/// Primitive shape of a part, in local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
	/// Capped cylinder along the Y axis, centered on the origin.
	Cylinder {
		radius_top: f32,
		radius_bottom: f32,
		height: f32,
		radial_segments: u32,
	},
	/// Ring lying in the XY plane.
	Torus {
		radius: f32,
		tube: f32,
		radial_segments: u32,
		tubular_segments: u32,
	},
	Sphere {
		radius: f32,
		width_segments: u32,
		height_segments: u32,
	},
	Cuboid {
		width: f32,
		height: f32,
		depth: f32,
	},
}

/// Physically based material parameters. `emissive` is the channel animated every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
	pub color: Vec3,
	pub emissive: Vec3,
	pub metalness: f32,
	pub roughness: f32,
	pub clearcoat: f32,
	pub clearcoat_roughness: f32,
}

impl Default for Material {
	fn default() -> Self {
		Self {
			color: Vec3::ONE,
			emissive: Vec3::ZERO,
			metalness: 0.0,
			roughness: 1.0,
			clearcoat: 0.0,
			clearcoat_roughness: 0.0,
		}
	}
}

impl Material {
	pub fn new(color: u32, metalness: f32, roughness: f32) -> Self {
		Self {
			color: rgb_hex(color),
			metalness,
			roughness,
			..Default::default()
		}
	}

	pub fn with_emissive(mut self, emissive: u32) -> Self {
		self.emissive = rgb_hex(emissive);
		self
	}

	pub fn with_clearcoat(mut self, clearcoat: f32, clearcoat_roughness: f32) -> Self {
		self.clearcoat = clearcoat;
		self.clearcoat_roughness = clearcoat_roughness;
		self
	}
}

/// `0xRRGGBB` to linear-agnostic `[0, 1]` channels.
pub fn rgb_hex(hex: u32) -> Vec3 {
	Vec3::new(
		((hex >> 16) & 0xff) as f32 / 255.0,
		((hex >> 8) & 0xff) as f32 / 255.0,
		(hex & 0xff) as f32 / 255.0,
	)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
	pub geometry: Geometry,
	pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
	Group,
	Part(Part),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
	pub uuid: NodeUuid,
	pub name: String,
	/// Hides the node and its whole subtree.
	pub visible: bool,
	pub transform: Transform,
	pub kind: NodeKind,
}

impl SceneNode {
	pub fn part(&self) -> Option<&Part> {
		match &self.kind {
			NodeKind::Part(part) => Some(part),
			NodeKind::Group => None,
		}
	}

	pub fn part_mut(&mut self) -> Option<&mut Part> {
		match &mut self.kind {
			NodeKind::Part(part) => Some(part),
			NodeKind::Group => None,
		}
	}

	pub fn is_group(&self) -> bool {
		matches!(self.kind, NodeKind::Group)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_channels() {
		assert_eq!(rgb_hex(0xff0000), Vec3::X);
		assert_eq!(rgb_hex(0x00ff00), Vec3::Y);
		assert_eq!(rgb_hex(0x004400), Vec3::new(0.0, 68.0 / 255.0, 0.0));
	}
}
