//! Scene settings. Defaults reproduce the landing page choreography; a JSON document can
//! override any subset of them.

pub mod json;

use glam::Vec3;

use crate::idle::{IdleConfig, IdleTiming};
use crate::math::camera::PerspectiveCamera;
use crate::scroll::trigger::{TriggerPoint, TriggerPointError};
use crate::scroll::RegionSpec;

use self::json::{JsonError, JsonObject};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid JSON: {0}")]
	Syntax(String),
	#[error("Config root is not an object")]
	RootIsNotObject,
	#[error(transparent)]
	Json(#[from] JsonError),
	#[error("Invalid trigger point at {key:?}: {source}")]
	TriggerPoint { key: String, source: TriggerPointError },
	#[error("Unknown idle timing {0:?}, expected \"per_frame\" or \"wall_clock\"")]
	UnknownTiming(String),
	#[error("Value at {0:?} must be positive")]
	NotPositive(String),
	#[error("{0:?} only applies to \"wall_clock\" timing")]
	NeedsWallClock(String),
}

impl ConfigError {
	pub fn nested(self, key: &str) -> Self {
		match self {
			ConfigError::Json(err) => ConfigError::Json(err.nested(key)),
			ConfigError::TriggerPoint { key: inner, source } => ConfigError::TriggerPoint {
				key: format!("{key}.{inner}"),
				source,
			},
			ConfigError::NotPositive(inner) => ConfigError::NotPositive(format!("{key}.{inner}")),
			ConfigError::NeedsWallClock(inner) => ConfigError::NeedsWallClock(format!("{key}.{inner}")),
			_ => self,
		}
	}
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn vals<T>(key: &str, res: ConfigResult<T>) -> ConfigResult<T> {
	res.map_err(|e| e.nested(key))
}

fn positive(key: &str, value: f32) -> ConfigResult<f32> {
	if value > 0.0 {
		Ok(value)
	} else {
		Err(ConfigError::NotPositive(key.to_owned()))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
	/// Vertical field of view, in degrees
	pub fov_y: f32,
	pub near: f32,
	pub far: f32,
	/// Pose before the first scroll update moves it.
	pub position: Vec3,
	pub target: Vec3,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			fov_y: 75.0,
			near: 0.1,
			far: 1000.0,
			position: Vec3::new(0.0, 1.0, 5.0),
			target: Vec3::ZERO,
		}
	}
}

impl CameraConfig {
	pub fn build(&self, aspect: f32) -> PerspectiveCamera {
		let mut camera = PerspectiveCamera::new(self.fov_y, aspect, self.near, self.far);
		camera.position = self.position;
		camera.look_at(self.target);
		camera
	}

	fn overlay(&mut self, obj: &JsonObject) -> ConfigResult<()> {
		if let Some(fov_y) = obj.get_opt("fov", JsonObject::get_f32)? {
			self.fov_y = positive("fov", fov_y)?;
		}
		if let Some(near) = obj.get_opt("near", JsonObject::get_f32)? {
			self.near = positive("near", near)?;
		}
		if let Some(far) = obj.get_opt("far", JsonObject::get_f32)? {
			self.far = positive("far", far)?;
		}
		if let Some(position) = obj.get_opt("position", JsonObject::get_vec3)? {
			self.position = position;
		}
		if let Some(target) = obj.get_opt("target", JsonObject::get_vec3)? {
			self.target = target;
		}
		Ok(())
	}
}

/// Scroll window of one page section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTrigger {
	/// Element id in the page.
	pub anchor: String,
	pub start: TriggerPoint,
	pub end: TriggerPoint,
}

impl SectionTrigger {
	pub fn new(anchor: &str, start: TriggerPoint, end: TriggerPoint) -> Self {
		Self {
			anchor: anchor.to_owned(),
			start,
			end,
		}
	}

	/// A scrubbed region without behaviors yet.
	pub fn region(&self) -> RegionSpec {
		RegionSpec::new(&self.anchor, self.start, self.end)
	}

	fn overlay(&mut self, obj: &JsonObject) -> ConfigResult<()> {
		if let Some(anchor) = obj.get_opt("anchor", JsonObject::get_str)? {
			self.anchor = anchor.to_owned();
		}
		for (key, point) in [("start", &mut self.start), ("end", &mut self.end)] {
			if let Some(text) = obj.get_opt(key, JsonObject::get_str)? {
				*point = text.parse().map_err(|source| ConfigError::TriggerPoint {
					key: key.to_owned(),
					source,
				})?;
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionsConfig {
	/// Spans the whole document and drives the global choreography.
	pub page: SectionTrigger,
	pub demo: SectionTrigger,
	pub features: SectionTrigger,
	pub how_it_works: SectionTrigger,
	pub pricing: SectionTrigger,
}

impl Default for SectionsConfig {
	fn default() -> Self {
		use crate::scroll::trigger::Offset::Fraction;

		let top = Fraction(0.0);
		let bottom = Fraction(1.0);
		let section = |anchor| {
			SectionTrigger::new(
				anchor,
				TriggerPoint::new(top, Fraction(0.8)),
				TriggerPoint::new(bottom, Fraction(0.2)),
			)
		};

		Self {
			page: SectionTrigger::new("body", TriggerPoint::new(top, top), TriggerPoint::new(bottom, bottom)),
			demo: section("demo"),
			features: section("caracteristicas"),
			how_it_works: section("como-funciona"),
			pricing: section("planes"),
		}
	}
}

impl SectionsConfig {
	fn overlay(&mut self, obj: &JsonObject) -> ConfigResult<()> {
		for (key, section) in [
			("page", &mut self.page),
			("demo", &mut self.demo),
			("features", &mut self.features),
			("how_it_works", &mut self.how_it_works),
			("pricing", &mut self.pricing),
		] {
			if let Some(section_obj) = obj.get_opt(key, JsonObject::get_object)? {
				vals(key, section.overlay(&section_obj))?;
			}
		}
		Ok(())
	}
}

fn overlay_idle(idle: &mut IdleConfig, obj: &JsonObject) -> ConfigResult<()> {
	if let Some(step) = obj.get_opt("rotation_step", JsonObject::get_vec3)? {
		idle.rotation_step = step;
	}
	for (key, slot) in [
		("float_amplitude", &mut idle.float_amplitude),
		("led_intensity", &mut idle.led_intensity),
		("sensor_intensity", &mut idle.sensor_intensity),
	] {
		if let Some(value) = obj.get_opt(key, JsonObject::get_f32)? {
			*slot = value;
		}
	}
	for (key, slot) in [
		("float_frequency", &mut idle.float_frequency),
		("led_frequency", &mut idle.led_frequency),
		("sensor_frequency", &mut idle.sensor_frequency),
		("sensor_threshold", &mut idle.sensor_threshold),
	] {
		if let Some(value) = obj.get_opt(key, JsonObject::get_f64)? {
			*slot = value;
		}
	}

	if let Some(timing) = obj.get_opt("timing", JsonObject::get_str)? {
		idle.timing = match timing {
			"per_frame" => IdleTiming::PerFrame,
			"wall_clock" => IdleTiming::WallClock { reference_fps: 60.0 },
			other => return Err(ConfigError::UnknownTiming(other.to_owned())),
		};
	}
	if let Some(fps) = obj.get_opt("reference_fps", JsonObject::get_f32)? {
		let fps = positive("reference_fps", fps)?;
		match &mut idle.timing {
			IdleTiming::WallClock { reference_fps } => *reference_fps = fps,
			IdleTiming::PerFrame => return Err(ConfigError::NeedsWallClock("reference_fps".to_owned())),
		}
	}
	Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
	/// Id of the element the drawing surface is attached to.
	pub container: String,
	pub camera: CameraConfig,
	pub idle: IdleConfig,
	pub sections: SectionsConfig,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			container: "cap-scene".to_owned(),
			camera: CameraConfig::default(),
			idle: IdleConfig::default(),
			sections: SectionsConfig::default(),
		}
	}
}

impl SceneConfig {
	/// Defaults overridden by whatever keys `text` contains.
	pub fn from_json(text: &str) -> ConfigResult<Self> {
		let value = ::json::parse(text).map_err(|e| ConfigError::Syntax(e.to_string()))?;
		let obj = JsonObject::from_value(&value).ok_or(ConfigError::RootIsNotObject)?;

		let mut config = Self::default();
		if let Some(container) = obj.get_opt("container", JsonObject::get_str)? {
			config.container = container.to_owned();
		}
		if let Some(camera) = obj.get_opt("camera", JsonObject::get_object)? {
			vals("camera", config.camera.overlay(&camera))?;
		}
		if let Some(idle) = obj.get_opt("idle", JsonObject::get_object)? {
			vals("idle", overlay_idle(&mut config.idle, &idle))?;
		}
		if let Some(sections) = obj.get_opt("sections", JsonObject::get_object)? {
			vals("sections", config.sections.overlay(&sections))?;
		}
		Ok(config)
	}
}
