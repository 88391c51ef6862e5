//! Scroll-independent motion: ambient rotation, LED pulse, sensor blink and floating.
//!
//! All appearance values are closed-form functions of the clock (milliseconds), so a frame can
//! be replayed from its clock value alone. Rotation accumulates per call.

use glam::Vec3;

use crate::model::CapModel;

/// How the ambient rotation step relates to time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdleTiming {
	/// A fixed step per rendered frame. Apparent speed follows the display refresh rate.
	PerFrame,
	/// The step is scaled by elapsed time, so `reference_fps` frames per second
	/// give the same speed as `PerFrame` at that rate.
	WallClock { reference_fps: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdleConfig {
	/// Radians added to the cap's rotation each frame.
	pub rotation_step: Vec3,
	pub float_amplitude: f32,
	pub float_frequency: f64,
	pub led_intensity: f32,
	pub led_frequency: f64,
	pub sensor_intensity: f32,
	pub sensor_frequency: f64,
	/// `sin(clock * sensor_frequency)` must exceed this for the sensor to light up.
	pub sensor_threshold: f64,
	pub timing: IdleTiming,
}

impl Default for IdleConfig {
	fn default() -> Self {
		Self {
			rotation_step: Vec3::new(0.008, 0.012, 0.005),
			float_amplitude: 0.3,
			float_frequency: 0.002,
			led_intensity: 0.3,
			led_frequency: 0.003,
			sensor_intensity: 0.5,
			sensor_frequency: 0.01,
			sensor_threshold: 0.8,
			timing: IdleTiming::PerFrame,
		}
	}
}

impl IdleConfig {
	/// LED green channel at `clock_ms`.
	pub fn led_pulse(&self, clock_ms: f64) -> f32 {
		self.led_intensity * (0.5 + 0.5 * (clock_ms * self.led_frequency).sin()) as f32
	}

	/// Whether the sensor is lit at `clock_ms`.
	pub fn sensor_lit(&self, clock_ms: f64) -> bool {
		(clock_ms * self.sensor_frequency).sin() > self.sensor_threshold
	}

	/// Vertical offset of the cap at `clock_ms`.
	pub fn float_offset(&self, clock_ms: f64) -> f32 {
		self.float_amplitude * (clock_ms * self.float_frequency).sin() as f32
	}
}

pub struct IdleAnimator {
	config: IdleConfig,
	last_clock: Option<f64>,
	frames: u64,
}

impl IdleAnimator {
	pub fn new(config: IdleConfig) -> Self {
		Self {
			config,
			last_clock: None,
			frames: 0,
		}
	}

	pub fn config(&self) -> &IdleConfig {
		&self.config
	}

	/// Number of ticks so far.
	pub fn frames(&self) -> u64 {
		self.frames
	}

	/// Advances the idle animation by one rendered frame.
	///
	/// Writes the cap's rotation and vertical position and the LED and sensor emissive colors.
	/// Never touches the internal system or the camera.
	pub fn tick(&mut self, model: &mut CapModel, clock_ms: f64) {
		let step = match self.config.timing {
			IdleTiming::PerFrame => self.config.rotation_step,
			IdleTiming::WallClock { reference_fps } => {
				// the first frame counts as exactly one reference frame
				let frames = match self.last_clock {
					Some(last) => ((clock_ms - last).max(0.0) / 1000.0) as f32 * reference_fps,
					None => 1.0,
				};
				self.config.rotation_step * frames
			}
		};
		self.last_clock = Some(clock_ms);
		self.frames += 1;

		let float_offset = self.config.float_offset(clock_ms);
		let transform = model.transform_mut();
		transform.rotation += step;
		transform.translation.y = float_offset;

		let pulse = self.config.led_pulse(clock_ms);
		if let Some(led) = model.material_mut(model.led_ring) {
			led.emissive = Vec3::new(0.0, pulse, 0.0);
		}

		let blink = if self.config.sensor_lit(clock_ms) {
			self.config.sensor_intensity
		} else {
			0.0
		};
		if let Some(sensor) = model.material_mut(model.sensor) {
			sensor.emissive = Vec3::new(blink, 0.0, 0.0);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::f64::consts::PI;

	use crate::model::build_cap;

	use super::*;

	fn snapshot(model: &CapModel) -> Vec<crate::node::SceneNode> {
		model.tree.pre_order_iter().cloned().collect()
	}

	#[test]
	fn tick_is_deterministic() {
		for clock in [0.0, 16.6, 1234.5, 1.7e12, -42.0] {
			let mut a = build_cap();
			let mut b = build_cap();
			IdleAnimator::new(IdleConfig::default()).tick(&mut a, clock);
			IdleAnimator::new(IdleConfig::default()).tick(&mut b, clock);
			assert_eq!(snapshot(&a), snapshot(&b), "clock {clock}");
		}
	}

	#[test]
	fn rotation_accumulates_per_frame() {
		let mut cap = build_cap();
		let mut idle = IdleAnimator::new(IdleConfig::default());
		for i in 0..10 {
			// clock spacing is irrelevant in per-frame mode
			idle.tick(&mut cap, (i * i) as f64 * 100.0);
		}
		let rot = cap.transform().rotation;
		assert!(rot.abs_diff_eq(Vec3::new(0.08, 0.12, 0.05), 1e-6), "{rot}");
		assert_eq!(idle.frames(), 10);
	}

	#[test]
	fn wall_clock_timing_scales_with_elapsed_time() {
		let config = IdleConfig {
			timing: IdleTiming::WallClock { reference_fps: 60.0 },
			..Default::default()
		};
		let mut cap = build_cap();
		let mut idle = IdleAnimator::new(config);
		idle.tick(&mut cap, 0.0);
		// half a second later: 30 reference frames
		idle.tick(&mut cap, 500.0);

		let rot = cap.transform().rotation;
		assert!(rot.abs_diff_eq(Vec3::new(0.008, 0.012, 0.005) * 31.0, 1e-5), "{rot}");
	}

	#[test]
	fn led_pulse_and_float_follow_closed_form() {
		let mut cap = build_cap();
		let clock = 523.0;
		IdleAnimator::new(IdleConfig::default()).tick(&mut cap, clock);

		let led = cap.material(cap.led_ring).unwrap().emissive;
		let expected = 0.3 * (0.5 + 0.5 * (clock * 0.003).sin()) as f32;
		assert_eq!(led, Vec3::new(0.0, expected, 0.0));
		assert_eq!(cap.transform().translation.y, 0.3 * (clock * 0.002).sin() as f32);
	}

	#[test]
	fn sensor_blink_matches_predicate() {
		let config = IdleConfig::default();
		let mut lit = 0;
		let samples = 10_000;
		// one period of sin(t * 0.01) is 200pi ms
		let period = 200.0 * PI;
		for i in 0..samples {
			let clock = 7.3 + i as f64 * period / samples as f64 + 1.0e6;
			let mut cap = build_cap();
			IdleAnimator::new(config.clone()).tick(&mut cap, clock);

			let emissive = cap.material(cap.sensor).unwrap().emissive;
			if (clock * 0.01).sin() > 0.8 {
				assert_eq!(emissive, Vec3::new(0.5, 0.0, 0.0));
				lit += 1;
			} else {
				assert_eq!(emissive, Vec3::ZERO);
			}
		}

		// sin(x) > 0.8 for (pi - 2 asin(0.8)) / 2pi of the period
		let expected = (PI - 2.0 * 0.8_f64.asin()) / (2.0 * PI);
		let fraction = lit as f64 / samples as f64;
		assert!((fraction - expected).abs() < 1e-2, "{fraction} vs {expected}");
	}

	#[test]
	fn idle_never_touches_internal_system() {
		let mut cap = build_cap();
		let mut idle = IdleAnimator::new(IdleConfig::default());
		for i in 0..100 {
			idle.tick(&mut cap, i as f64 * 16.0);
		}
		assert!(!cap.internal_system_visible());

		cap.set_internal_system_visible(true);
		idle.tick(&mut cap, 1600.0);
		assert!(cap.internal_system_visible());
	}
}
