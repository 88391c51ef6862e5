use std::f32::consts::{PI, TAU};

use glam::vec3;
use tracing::debug;

use crate::scene::Scene;

use super::trigger::Transition;
use super::tween::Tween;

/// What a trigger region does to the scene.
///
/// `on_progress` is called when the region's clamped progress changes, `on_transition` on
/// every state change and `advance` once per rendered frame with the frame's duration in seconds.
pub trait RegionBehavior {
	fn on_progress(&mut self, _scene: &mut Scene, _progress: f32) {}

	fn on_transition(&mut self, _scene: &mut Scene, _transition: Transition) {}

	fn advance(&mut self, _scene: &mut Scene, _dt: f32, _active: bool) {}
}

/// Page-wide choreography: the cap sweeps sideways and towards the viewer while growing,
/// the camera arcs around it and keeps looking at it.
pub struct GlobalChoreography;

impl GlobalChoreography {
	pub fn apply(scene: &mut Scene, p: f32) {
		let transform = scene.model.transform_mut();
		transform.translation.x = (p * TAU).sin() * 2.0;
		transform.translation.z = -5.0 + p * 8.0;
		transform.set_uniform_scale(0.5 + p * 1.5);
		let cap = transform.translation;

		let camera = &mut scene.camera;
		camera.position = vec3(3.0 + (p * PI).sin() * 2.0, 2.0 + (p * PI).cos(), 8.0 - p * 3.0);
		camera.look_at(cap);
	}
}

impl RegionBehavior for GlobalChoreography {
	fn on_progress(&mut self, scene: &mut Scene, progress: f32) {
		Self::apply(scene, progress);
	}
}

/// Plays a tween in lockstep with the region's progress.
pub struct Scrub(pub Tween);

impl RegionBehavior for Scrub {
	fn on_progress(&mut self, scene: &mut Scene, progress: f32) {
		if !self.0.render(&mut scene.model.tree, progress) {
			debug!("Scrubbed node {} is gone", self.0.node().raw());
		}
	}
}

/// Repeats a tween over its duration for as long as the region is active.
///
/// Each entry restarts the cycle from the node's current state.
pub struct LoopWhileActive {
	tween: Tween,
	elapsed: f32,
}

impl LoopWhileActive {
	pub fn new(tween: Tween) -> Self {
		Self { tween, elapsed: 0.0 }
	}
}

impl RegionBehavior for LoopWhileActive {
	fn on_transition(&mut self, _scene: &mut Scene, transition: Transition) {
		if transition.is_entering() {
			self.tween.invalidate();
			self.elapsed = 0.0;
		}
	}

	fn advance(&mut self, scene: &mut Scene, dt: f32, active: bool) {
		if !active {
			return;
		}
		let duration = self.tween.get_duration().max(f32::EPSILON);
		self.elapsed = (self.elapsed + dt.max(0.0)) % duration;
		self.tween.render(&mut scene.model.tree, self.elapsed / duration);
	}
}

/// Shows the cap's internal system while the region is active.
pub struct RevealInternalSystem;

impl RegionBehavior for RevealInternalSystem {
	fn on_transition(&mut self, scene: &mut Scene, transition: Transition) {
		scene.model.set_internal_system_visible(transition.is_entering());
	}
}

/// Calls a closure with every progress change.
pub struct OnProgress<F>(pub F);

impl<F: FnMut(&mut Scene, f32)> RegionBehavior for OnProgress<F> {
	fn on_progress(&mut self, scene: &mut Scene, progress: f32) {
		(self.0)(scene, progress)
	}
}

/// Calls a closure with every transition.
pub struct OnTransition<F>(pub F);

impl<F: FnMut(&mut Scene, Transition)> RegionBehavior for OnTransition<F> {
	fn on_transition(&mut self, scene: &mut Scene, transition: Transition) {
		(self.0)(scene, transition)
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use crate::math::camera::PerspectiveCamera;
	use crate::math::ease::Ease;
	use crate::model::build_cap;
	use crate::scroll::tween::{Axis, Channel};

	use super::*;

	fn scene() -> Scene {
		Scene::new(build_cap(), PerspectiveCamera::default())
	}

	#[test]
	fn global_start_pose() {
		let mut scene = scene();
		GlobalChoreography::apply(&mut scene, 0.0);

		let transform = scene.model.transform();
		assert_eq!(transform.translation.x, 0.0);
		assert_eq!(transform.translation.z, -5.0);
		assert_eq!(transform.scale, Vec3::splat(0.5));
		assert_eq!(scene.camera.position, vec3(3.0, 3.0, 8.0));
		assert_eq!(scene.camera.target, transform.translation);
	}

	#[test]
	fn global_end_pose() {
		let mut scene = scene();
		GlobalChoreography::apply(&mut scene, 1.0);

		let transform = scene.model.transform();
		assert!(transform.translation.x.abs() < 1e-5);
		assert_eq!(transform.translation.z, 3.0);
		assert_eq!(transform.scale, Vec3::splat(2.0));
		assert!(scene.camera.position.abs_diff_eq(vec3(3.0, 1.0, 5.0), 1e-5));
		assert_eq!(scene.camera.target, transform.translation);
	}

	#[test]
	fn global_leaves_floating_alone() {
		let mut scene = scene();
		scene.model.transform_mut().translation.y = 0.25;
		GlobalChoreography::apply(&mut scene, 0.3);
		assert_eq!(scene.model.transform().translation.y, 0.25);
	}

	#[test]
	fn loop_runs_only_while_active() {
		let mut scene = scene();
		let root = scene.model.root;
		let mut spin = LoopWhileActive::new(
			Tween::new(root)
				.by(Channel::Rotation(Axis::Z), TAU)
				.ease(Ease::Linear)
				.duration(2.0),
		);

		spin.advance(&mut scene, 0.5, false);
		assert_eq!(scene.model.transform().rotation.z, 0.0);

		spin.on_transition(&mut scene, Transition::Enter);
		spin.advance(&mut scene, 0.5, true);
		assert!((scene.model.transform().rotation.z - TAU / 4.0).abs() < 1e-5);
		// wraps around after a full cycle
		spin.advance(&mut scene, 2.0, true);
		assert!((scene.model.transform().rotation.z - TAU / 4.0).abs() < 1e-5);
	}

	#[test]
	fn reveal_follows_transitions() {
		let mut scene = scene();
		let mut reveal = RevealInternalSystem;
		for (transition, visible) in [
			(Transition::Enter, true),
			(Transition::Leave, false),
			(Transition::EnterBack, true),
			(Transition::LeaveBack, false),
		] {
			reveal.on_transition(&mut scene, transition);
			assert_eq!(scene.model.internal_system_visible(), visible, "{transition:?}");
		}
	}
}
