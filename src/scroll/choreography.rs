//! The cap's scroll choreography across the landing page sections.

use std::f32::consts::{PI, TAU};

use glam::vec3;

use crate::config::SectionsConfig;
use crate::math::ease::{Ease, EaseDir};
use crate::model::CapModel;

use super::behavior::{GlobalChoreography, LoopWhileActive, RevealInternalSystem, Scrub};
use super::tween::{Axis, Channel, Tween};
use super::RegionSpec;

/// Regions in registration order: the page-wide motion first, then each section in page order.
/// Later regions win on the channels they share with earlier ones.
pub fn cap_choreography(sections: &SectionsConfig, model: &CapModel) -> Vec<RegionSpec> {
	let cap = model.root;

	vec![
		sections.page.region().with(GlobalChoreography),
		// a full turn every 2 s while the demo is on screen
		sections.demo.region().timed().with(LoopWhileActive::new(
			Tween::new(cap)
				.by(Channel::Rotation(Axis::Z), TAU)
				.ease(Ease::Linear)
				.duration(2.0),
		)),
		sections
			.features
			.region()
			.with(Scrub(Tween::new(cap).to(Channel::Translation(Axis::X), -3.0))),
		sections
			.how_it_works
			.region()
			.with(Scrub(Tween::new(cap).to(Channel::Translation(Axis::X), 3.0))),
		sections.how_it_works.region().with(Scrub(
			Tween::new(cap)
				.rotate_to(vec3(0.3 * PI, 4.0 * PI, 0.2 * PI))
				.ease(Ease::Power {
					order: 2,
					dir: EaseDir::InOut,
				})
				.duration(3.0),
		)),
		sections.how_it_works.region().with(RevealInternalSystem),
		sections
			.pricing
			.region()
			.with(Scrub(Tween::new(cap).to(Channel::UniformScale, 2.5))),
	]
}

#[cfg(test)]
mod tests {
	use crate::host::simulated::SimulatedHost;
	use crate::host::ViewportSize;
	use crate::math::camera::PerspectiveCamera;
	use crate::model::build_cap;
	use crate::scene::Scene;
	use crate::scroll::ScrollTimeline;

	use super::*;

	fn attached() -> (SimulatedHost, Scene, ScrollTimeline) {
		let host = SimulatedHost::landing_page(ViewportSize::new(1600, 1000));
		let mut scene = Scene::new(build_cap(), PerspectiveCamera::default());
		let specs = cap_choreography(&SectionsConfig::default(), &scene.model);
		let timeline = ScrollTimeline::attach(&host, &mut scene, specs);
		(host, scene, timeline)
	}

	#[test]
	fn registration_order() {
		let (_, _, timeline) = attached();
		let anchors: Vec<&str> = timeline.regions().map(|r| r.anchor()).collect();
		assert_eq!(
			anchors,
			[
				"body",
				"demo",
				"caracteristicas",
				"como-funciona",
				"como-funciona",
				"como-funciona",
				"planes"
			]
		);
	}

	#[test]
	fn features_pull_cap_left() {
		let (_, mut scene, mut timeline) = attached();
		// caracteristicas spans 1200..2800, como-funciona starts at 2200
		timeline.update(2199.0, &mut scene).unwrap();
		let x = scene.model.transform().translation.x;
		assert!(x < 0.0 && x > -3.0, "{x}");
	}

	#[test]
	fn how_it_works_wins_over_features() {
		let (_, mut scene, mut timeline) = attached();
		// both moving: how-it-works is registered later
		timeline.update(2600.0, &mut scene).unwrap();
		let x = scene.model.transform().translation.x;
		assert!(x > 0.0, "{x}");
	}

	#[test]
	fn rotation_reaches_target_at_end_of_how_it_works() {
		let (_, mut scene, mut timeline) = attached();
		timeline.update(3000.0, &mut scene).unwrap();
		timeline.update(3799.0, &mut scene).unwrap();
		timeline.update(3801.0, &mut scene).unwrap();

		let rotation = scene.model.transform().rotation;
		assert!(rotation.abs_diff_eq(vec3(0.3 * PI, 4.0 * PI, 0.2 * PI), 1e-4), "{rotation}");
	}

	#[test]
	fn pricing_scales_up() {
		let (host, mut scene, mut timeline) = attached();
		timeline.update(host.max_scroll(), &mut scene).unwrap();
		// planes spans 3200..4800, max scroll is 4500
		let scale = scene.model.transform().scale.x;
		assert!(scale > 2.0 && scale < 2.5, "{scale}");
	}
}
