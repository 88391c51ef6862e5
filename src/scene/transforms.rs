use std::collections::HashMap;

use glam::Mat4;

use crate::node::{NodeUuid, Part, SceneNode};

use super::SceneTree;

impl SceneTree {
	/// Absolute transforms of all nodes, combining each node's ancestors in pre-order.
	pub fn world_transforms(&self) -> HashMap<NodeUuid, Mat4> {
		let mut world = HashMap::with_capacity(self.len());
		for node_id in self.root_internal_id().descendants(&self.arena) {
			let node = self.arena[node_id].get();
			let base = match self.arena[node_id].parent() {
				Some(parent) => world[&self.arena[parent].get().uuid],
				None => Mat4::IDENTITY,
			};
			world.insert(node.uuid, base * node.transform.to_matrix());
		}
		world
	}

	/// A node is drawn only if it and all of its ancestors are visible.
	pub fn is_effectively_visible(&self, id: NodeUuid) -> bool {
		let Some(node_id) = self.internal_id(id) else {
			return false;
		};
		node_id.ancestors(&self.arena).all(|n| self.arena[n].get().visible)
	}

	/// Visits visible parts in pre-order with their absolute transforms.
	/// Hidden subtrees are skipped entirely. Stops at the first error.
	pub fn visit_visible_parts<E>(&self, mut f: impl FnMut(&SceneNode, &Part, &Mat4) -> Result<(), E>) -> Result<(), E> {
		let mut stack = vec![(self.root_internal_id(), Mat4::IDENTITY)];

		while let Some((node_id, base)) = stack.pop() {
			let node = self.arena[node_id].get();
			if !node.visible {
				continue;
			}

			let world = base * node.transform.to_matrix();
			if let Some(part) = node.part() {
				f(node, part, &world)?;
			}

			// reversed so that the first child is popped first
			let children: Vec<_> = node_id.children(&self.arena).collect();
			stack.extend(children.into_iter().rev().map(|child| (child, world)));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use crate::math::transform::Transform;
	use crate::node::{Geometry, Material, NodeKind, Part};

	use super::*;

	fn ball() -> NodeKind {
		NodeKind::Part(Part {
			geometry: Geometry::Sphere {
				radius: 1.0,
				width_segments: 4,
				height_segments: 4,
			},
			material: Material::default(),
		})
	}

	#[test]
	fn world_transforms_compose_with_ancestors() {
		let mut tree = SceneTree::new_with_root("root", Transform::from_translation(Vec3::X), NodeKind::Group);
		let group = tree.add(
			tree.root(),
			"group",
			Transform::from_translation(Vec3::Y).with_scale(Vec3::splat(2.0)),
			NodeKind::Group,
		);
		let leaf = tree.add(group, "leaf", Transform::from_translation(Vec3::Z), ball());

		let world = tree.world_transforms();
		let p = world[&leaf].transform_point3(Vec3::ZERO);
		assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 2.0), 1e-6), "{p}");
	}

	#[test]
	fn hidden_groups_hide_their_subtree() {
		let mut tree = SceneTree::new_with_root("root", Transform::default(), NodeKind::Group);
		let a = tree.add(tree.root(), "a", Transform::default(), ball());
		let hidden = tree.add(tree.root(), "hidden", Transform::default(), NodeKind::Group);
		let b = tree.add(hidden, "b", Transform::default(), ball());
		let c = tree.add(tree.root(), "c", Transform::default(), ball());
		tree.get_node_mut(hidden).unwrap().visible = false;

		let mut visited = Vec::new();
		tree.visit_visible_parts(|node, _, _| {
			visited.push(node.uuid);
			Ok::<_, ()>(())
		})
		.unwrap();

		assert_eq!(visited, [a, c]);
		assert!(tree.is_effectively_visible(a));
		assert!(!tree.is_effectively_visible(b));
	}

	#[test]
	fn visiting_stops_at_first_error() {
		let mut tree = SceneTree::new_with_root("root", Transform::default(), NodeKind::Group);
		tree.add(tree.root(), "a", Transform::default(), ball());
		tree.add(tree.root(), "b", Transform::default(), ball());

		let mut calls = 0;
		let res = tree.visit_visible_parts(|_, _, _| {
			calls += 1;
			Err("context lost")
		});

		assert_eq!(res, Err("context lost"));
		assert_eq!(calls, 1);
	}
}
