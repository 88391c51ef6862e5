use glam::Vec3;

use crate::math::ease::Ease;
use crate::math::interp::{interpolate_f32, InterpRange};
use crate::math::transform::Transform;
use crate::node::NodeUuid;
use crate::scene::SceneTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
	Z,
}

impl Axis {
	fn get(self, v: Vec3) -> f32 {
		match self {
			Axis::X => v.x,
			Axis::Y => v.y,
			Axis::Z => v.z,
		}
	}

	fn get_mut(self, v: &mut Vec3) -> &mut f32 {
		match self {
			Axis::X => &mut v.x,
			Axis::Y => &mut v.y,
			Axis::Z => &mut v.z,
		}
	}
}

/// A single scalar of a node transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
	Translation(Axis),
	Rotation(Axis),
	/// Reads the x scale, writes all three.
	UniformScale,
}

impl Channel {
	pub fn read(self, transform: &Transform) -> f32 {
		match self {
			Channel::Translation(axis) => axis.get(transform.translation),
			Channel::Rotation(axis) => axis.get(transform.rotation),
			Channel::UniformScale => transform.scale.x,
		}
	}

	pub fn write(self, transform: &mut Transform, value: f32) {
		match self {
			Channel::Translation(axis) => *axis.get_mut(&mut transform.translation) = value,
			Channel::Rotation(axis) => *axis.get_mut(&mut transform.rotation) = value,
			Channel::UniformScale => transform.set_uniform_scale(value),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
	/// Absolute end value.
	To(f32),
	/// End value relative to the captured start.
	By(f32),
}

#[derive(Debug, Clone, PartialEq)]
struct TweenProp {
	channel: Channel,
	target: TweenTarget,
	/// Start and end values, captured the first time the tween renders.
	range: Option<InterpRange<f32>>,
}

/// Animates channels of one node from wherever they are on first render to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
	node: NodeUuid,
	props: Vec<TweenProp>,
	ease: Ease,
	/// In seconds. Scrubbed tweens stretch over their whole region instead.
	duration: f32,
}

impl Tween {
	pub fn new(node: NodeUuid) -> Self {
		Self {
			node,
			props: Vec::new(),
			ease: Ease::default(),
			duration: 1.0,
		}
	}

	pub fn to(mut self, channel: Channel, value: f32) -> Self {
		self.props.push(TweenProp {
			channel,
			target: TweenTarget::To(value),
			range: None,
		});
		self
	}

	pub fn by(mut self, channel: Channel, delta: f32) -> Self {
		self.props.push(TweenProp {
			channel,
			target: TweenTarget::By(delta),
			range: None,
		});
		self
	}

	/// Tweens all three rotation axes to absolute angles.
	pub fn rotate_to(self, rotation: Vec3) -> Self {
		self.to(Channel::Rotation(Axis::X), rotation.x)
			.to(Channel::Rotation(Axis::Y), rotation.y)
			.to(Channel::Rotation(Axis::Z), rotation.z)
	}

	pub fn ease(mut self, ease: Ease) -> Self {
		self.ease = ease;
		self
	}

	pub fn duration(mut self, seconds: f32) -> Self {
		self.duration = seconds;
		self
	}

	pub fn node(&self) -> NodeUuid {
		self.node
	}

	pub fn get_duration(&self) -> f32 {
		self.duration
	}

	pub fn is_started(&self) -> bool {
		self.props.iter().any(|prop| prop.range.is_some())
	}

	/// Forgets the captured start values, so the next render starts from the current state.
	pub fn invalidate(&mut self) {
		for prop in &mut self.props {
			prop.range = None;
		}
	}

	/// Sets the animated channels to their value at `progress` (linear, before easing).
	/// Returns false if the node no longer exists.
	pub fn render(&mut self, tree: &mut SceneTree, progress: f32) -> bool {
		let Some(node) = tree.get_node_mut(self.node) else {
			return false;
		};
		let transform = &mut node.transform;
		let eased = self.ease.apply(progress);

		for prop in &mut self.props {
			let (channel, target) = (prop.channel, prop.target);
			let range = *prop.range.get_or_insert_with(|| {
				let from = channel.read(transform);
				let to = match target {
					TweenTarget::To(value) => value,
					TweenTarget::By(delta) => from + delta,
				};
				InterpRange::new(from, to)
			});
			channel.write(transform, interpolate_f32(eased, range));
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use crate::math::ease::EaseDir;
	use crate::node::NodeKind;

	use super::*;

	fn tree_at(x: f32) -> SceneTree {
		SceneTree::new_with_root("cap", Transform::from_translation(Vec3::new(x, 0.0, 0.0)), NodeKind::Group)
	}

	#[test]
	fn captures_start_on_first_render() {
		let mut tree = tree_at(1.0);
		let root = tree.root();
		let mut tween = Tween::new(root).to(Channel::Translation(Axis::X), -3.0).ease(Ease::Linear);
		assert!(!tween.is_started());

		tween.render(&mut tree, 0.5);
		assert_eq!(tree.get_node(root).unwrap().transform.translation.x, -1.0);

		// somebody else moves the node: the start value stays captured
		tree.get_node_mut(root).unwrap().transform.translation.x = 10.0;
		tween.render(&mut tree, 0.0);
		assert_eq!(tree.get_node(root).unwrap().transform.translation.x, 1.0);
		tween.render(&mut tree, 1.0);
		assert_eq!(tree.get_node(root).unwrap().transform.translation.x, -3.0);

		tween.invalidate();
		tree.get_node_mut(root).unwrap().transform.translation.x = 5.0;
		tween.render(&mut tree, 0.5);
		assert_eq!(tree.get_node(root).unwrap().transform.translation.x, 1.0);
	}

	#[test]
	fn eases_and_relative_targets() {
		let mut tree = tree_at(0.0);
		let root = tree.root();
		let mut tween = Tween::new(root)
			.by(Channel::Rotation(Axis::Z), 2.0)
			.to(Channel::UniformScale, 3.0)
			.ease(Ease::Power {
				order: 1,
				dir: EaseDir::In,
			});

		tween.render(&mut tree, 0.5);
		let transform = &tree.get_node(root).unwrap().transform;
		assert_eq!(transform.rotation.z, 0.5);
		assert_eq!(transform.scale, Vec3::splat(1.5));
	}

	#[test]
	fn rotate_to_sets_every_axis() {
		let mut tree = tree_at(0.0);
		let root = tree.root();
		let target = Vec3::new(0.3, 4.0, 0.2);
		let mut tween = Tween::new(root).rotate_to(target).duration(3.0);
		assert_eq!(tween.get_duration(), 3.0);

		tween.render(&mut tree, 1.0);
		assert_eq!(tree.get_node(root).unwrap().transform.rotation, target);
	}

	#[test]
	fn missing_node_is_reported() {
		let mut tree = tree_at(0.0);
		let mut tween = Tween::new(NodeUuid(999)).to(Channel::UniformScale, 2.0);
		assert!(!tween.render(&mut tree, 1.0));
	}
}
