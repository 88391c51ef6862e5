use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::math::transform::Transform;
use crate::node::{Geometry, Material, NodeKind, NodeUuid, Part};
use crate::scene::SceneTree;

/// The cap: a root group with its visible shell parts and a hidden internal system.
pub struct CapModel {
	pub tree: SceneTree,
	pub root: NodeUuid,
	pub body: NodeUuid,
	pub top: NodeUuid,
	pub led_ring: NodeUuid,
	pub sensor: NodeUuid,
	pub internal_system: NodeUuid,
	pub board: NodeUuid,
	pub wires: [NodeUuid; 4],
	pub battery: NodeUuid,
}

const WIRE_COLORS: [u32; 4] = [0xdc2626, 0x111827, 0xeab308, 0x3b82f6];

fn part(geometry: Geometry, material: Material) -> NodeKind {
	NodeKind::Part(Part { geometry, material })
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Geometry {
	Geometry::Cylinder {
		radius_top,
		radius_bottom,
		height,
		radial_segments,
	}
}

/// Builds the cap hierarchy. Deterministic: two builds are identical.
pub fn build_cap() -> CapModel {
	let mut tree = SceneTree::new_with_root("cap", Transform::default(), NodeKind::Group);
	let root = tree.root();

	let body = tree.add(
		root,
		"body",
		Transform::default(),
		part(
			cylinder(1.2, 1.3, 0.3, 32),
			Material::new(0x2563eb, 0.7, 0.3).with_clearcoat(1.0, 0.1),
		),
	);

	let top = tree.add(
		root,
		"top",
		Transform::from_translation(Vec3::new(0.0, 0.175, 0.0)),
		part(
			cylinder(1.1, 1.1, 0.05, 32),
			Material::new(0x1d4ed8, 0.8, 0.2).with_clearcoat(1.0, 0.0),
		),
	);

	let led_ring = tree.add(
		root,
		"ledRing",
		Transform::from_translation(Vec3::new(0.0, 0.1, 0.0)),
		part(
			Geometry::Torus {
				radius: 0.9,
				tube: 0.05,
				radial_segments: 8,
				tubular_segments: 16,
			},
			Material::new(0x00ff00, 0.1, 0.3).with_emissive(0x004400),
		),
	);

	let sensor = tree.add(
		root,
		"sensor",
		Transform::from_translation(Vec3::new(0.0, 0.2, 0.0)),
		part(
			Geometry::Sphere {
				radius: 0.1,
				width_segments: 16,
				height_segments: 16,
			},
			Material::new(0xff0000, 0.2, 0.4).with_emissive(0x440000),
		),
	);

	let internal_system = tree.add(root, "internalSystem", Transform::default(), NodeKind::Group);

	let board = tree.add(
		internal_system,
		"board",
		Transform::from_translation(Vec3::new(0.0, -0.04, 0.0)),
		part(
			Geometry::Cuboid {
				width: 1.6,
				height: 0.04,
				depth: 1.0,
			},
			Material::new(0x166534, 0.3, 0.6),
		),
	);

	let wires = [0, 1, 2, 3].map(|i| {
		let z = -0.3 + 0.2 * i as f32;
		tree.add(
			internal_system,
			&format!("wire{i}"),
			Transform::from_translation(Vec3::new(0.0, 0.02, z)).with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2)),
			part(cylinder(0.015, 0.015, 0.6, 8), Material::new(WIRE_COLORS[i], 0.5, 0.5)),
		)
	});

	let battery = tree.add(
		internal_system,
		"battery",
		Transform::from_translation(Vec3::new(0.5, 0.1, 0.0)).with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
		part(cylinder(0.12, 0.12, 0.5, 24), Material::new(0x52525b, 0.6, 0.4)),
	);

	if let Some(node) = tree.get_node_mut(internal_system) {
		node.visible = false;
	}

	CapModel {
		tree,
		root,
		body,
		top,
		led_ring,
		sensor,
		internal_system,
		board,
		wires,
		battery,
	}
}

impl CapModel {
	/// Transform of the whole cap.
	pub fn transform(&self) -> &Transform {
		&self.tree.get_node(self.root).expect("cap root is never removed").transform
	}

	pub fn transform_mut(&mut self) -> &mut Transform {
		&mut self.tree.get_node_mut(self.root).expect("cap root is never removed").transform
	}

	pub fn material(&self, id: NodeUuid) -> Option<&Material> {
		Some(&self.tree.get_node(id)?.part()?.material)
	}

	pub fn material_mut(&mut self, id: NodeUuid) -> Option<&mut Material> {
		Some(&mut self.tree.get_node_mut(id)?.part_mut()?.material)
	}

	pub fn internal_system_visible(&self) -> bool {
		self.tree.get_node(self.internal_system).map_or(false, |node| node.visible)
	}

	/// Only the scroll timeline's visibility behavior toggles the internal system.
	pub(crate) fn set_internal_system_visible(&mut self, visible: bool) {
		if let Some(node) = self.tree.get_node_mut(self.internal_system) {
			node.visible = visible;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hierarchy_has_every_part() {
		let cap = build_cap();
		let tree = &cap.tree;

		assert_eq!(tree.len(), 12);
		let children: Vec<&str> = tree.get_children(cap.root).map(|n| n.name.as_str()).collect();
		assert_eq!(children, ["body", "top", "ledRing", "sensor", "internalSystem"]);

		let internals: Vec<&str> = tree.get_children(cap.internal_system).map(|n| n.name.as_str()).collect();
		assert_eq!(internals, ["board", "wire0", "wire1", "wire2", "wire3", "battery"]);
		assert!(tree.get_node(cap.internal_system).unwrap().is_group());
		assert!(tree.get_node(cap.root).unwrap().is_group());
	}

	#[test]
	fn internal_system_starts_hidden() {
		let cap = build_cap();
		assert!(!cap.internal_system_visible());
		assert!(!cap.tree.is_effectively_visible(cap.battery));
		assert!(cap.tree.is_effectively_visible(cap.sensor));
	}

	#[test]
	fn builds_are_identical() {
		let a = build_cap();
		let b = build_cap();
		let a_nodes: Vec<_> = a.tree.pre_order_iter().cloned().collect();
		let b_nodes: Vec<_> = b.tree.pre_order_iter().cloned().collect();
		assert_eq!(a_nodes, b_nodes);
	}

	#[test]
	fn documented_materials() {
		let cap = build_cap();
		let body = cap.material(cap.body).unwrap();
		assert_eq!(body.metalness, 0.7);
		assert_eq!(body.roughness, 0.3);
		assert_eq!(body.clearcoat, 1.0);

		let led = cap.material(cap.led_ring).unwrap();
		assert_eq!(led.emissive, crate::node::rgb_hex(0x004400));
		assert!(cap.material(cap.internal_system).is_none());
		assert_eq!(cap.transform(), &Transform::default());
	}
}
