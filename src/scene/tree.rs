use std::collections::HashMap;

use indextree::Arena;

use crate::math::transform::Transform;
use crate::node::{NodeKind, NodeUuid, SceneNode};

/// Strictly hierarchical node storage: every node but the root has exactly one parent.
pub struct SceneTree {
	root_id: indextree::NodeId,
	pub(super) arena: Arena<SceneNode>,
	node_ids: HashMap<NodeUuid, indextree::NodeId>,
	next_uuid: u32,
}

impl SceneTree {
	pub fn new_with_root(name: &str, transform: Transform, kind: NodeKind) -> Self {
		let uuid = NodeUuid(0);
		let mut arena = Arena::new();
		let root_id = arena.new_node(SceneNode {
			uuid,
			name: name.to_owned(),
			visible: true,
			transform,
			kind,
		});

		let mut node_ids = HashMap::new();
		node_ids.insert(uuid, root_id);

		Self {
			root_id,
			arena,
			node_ids,
			next_uuid: 1,
		}
	}

	pub fn root(&self) -> NodeUuid {
		self.arena[self.root_id].get().uuid
	}

	/// Appends a new node under `parent` and returns its freshly assigned uuid.
	///
	/// Panics if `parent` is not in the tree.
	pub fn add(&mut self, parent: NodeUuid, name: &str, transform: Transform, kind: NodeKind) -> NodeUuid {
		let parent_id = *self.node_ids.get(&parent).expect("parent should be added earlier");

		let uuid = NodeUuid(self.next_uuid);
		self.next_uuid += 1;

		let node_id = self.arena.new_node(SceneNode {
			uuid,
			name: name.to_owned(),
			visible: true,
			transform,
			kind,
		});
		parent_id.append(node_id, &mut self.arena);
		self.node_ids.insert(uuid, node_id);

		uuid
	}

	fn get_internal_node(&self, id: NodeUuid) -> Option<&indextree::Node<SceneNode>> {
		self.arena.get(*self.node_ids.get(&id)?)
	}

	fn get_internal_node_mut(&mut self, id: NodeUuid) -> Option<&mut indextree::Node<SceneNode>> {
		self.arena.get_mut(*self.node_ids.get(&id)?)
	}

	pub fn get_node(&self, id: NodeUuid) -> Option<&SceneNode> {
		Some(self.get_internal_node(id)?.get())
	}

	pub fn get_node_mut(&mut self, id: NodeUuid) -> Option<&mut SceneNode> {
		Some(self.get_internal_node_mut(id)?.get_mut())
	}

	pub fn get_parent(&self, id: NodeUuid) -> Option<&SceneNode> {
		let parent_id = self.get_internal_node(id)?.parent()?;
		Some(self.arena[parent_id].get())
	}

	pub fn get_children(&self, id: NodeUuid) -> impl Iterator<Item = &SceneNode> {
		let node_id = self.node_ids.get(&id).copied();
		node_id
			.into_iter()
			.flat_map(move |node_id| node_id.children(&self.arena))
			.map(move |child| self.arena[child].get())
	}

	/// Parents before children, siblings in insertion order.
	pub fn pre_order_iter(&self) -> impl Iterator<Item = &SceneNode> {
		self.root_id.descendants(&self.arena).map(move |id| self.arena[id].get())
	}

	pub fn find(&self, name: &str) -> Option<NodeUuid> {
		self.pre_order_iter().find(|node| node.name == name).map(|node| node.uuid)
	}

	pub fn len(&self) -> usize {
		self.node_ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.node_ids.is_empty()
	}

	/// Destroys `id` together with its whole subtree. Returns the number of removed nodes.
	///
	/// The root cannot be removed; `None` is returned for it and for unknown uuids.
	pub fn remove_subtree(&mut self, id: NodeUuid) -> Option<usize> {
		let node_id = *self.node_ids.get(&id)?;
		if node_id == self.root_id {
			return None;
		}

		let doomed: Vec<NodeUuid> = node_id.descendants(&self.arena).map(|n| self.arena[n].get().uuid).collect();
		node_id.remove_subtree(&mut self.arena);
		for uuid in &doomed {
			self.node_ids.remove(uuid);
		}

		Some(doomed.len())
	}

	pub(super) fn internal_id(&self, id: NodeUuid) -> Option<indextree::NodeId> {
		self.node_ids.get(&id).copied()
	}

	pub(super) fn root_internal_id(&self) -> indextree::NodeId {
		self.root_id
	}
}
