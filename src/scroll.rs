//! Scroll-driven animation: trigger regions bound to document anchors, evaluated against the
//! scroll offset, dispatching progress and transitions to their behaviors.

pub mod behavior;
pub mod choreography;
pub mod trigger;
pub mod tween;

use tracing::{debug, error, info, warn};

use crate::host::Document;
use crate::math::interp::InterpRange;
use crate::scene::Scene;

use behavior::RegionBehavior;
use trigger::{RegionState, Transition, TriggerPoint};

/// Description of a trigger region, resolved against the document on attach.
pub struct RegionSpec {
	pub anchor: String,
	pub start: TriggerPoint,
	pub end: TriggerPoint,
	/// Scrubbed regions report progress. Others only report transitions and advance with time.
	pub scrub: bool,
	pub behaviors: Vec<Box<dyn RegionBehavior>>,
}

impl RegionSpec {
	pub fn new(anchor: &str, start: TriggerPoint, end: TriggerPoint) -> Self {
		Self {
			anchor: anchor.to_owned(),
			start,
			end,
			scrub: true,
			behaviors: Vec::new(),
		}
	}

	/// Turns off progress reporting.
	pub fn timed(mut self) -> Self {
		self.scrub = false;
		self
	}

	pub fn with(mut self, behavior: impl RegionBehavior + 'static) -> Self {
		self.behaviors.push(Box::new(behavior));
		self
	}
}

pub struct TriggerRegion {
	anchor: String,
	start: TriggerPoint,
	end: TriggerPoint,
	scrub: bool,
	/// Scroll offsets of the start and end points, `None` while the anchor is missing.
	bounds: Option<InterpRange<f32>>,
	state: RegionState,
	progress: Option<f32>,
	behaviors: Vec<Box<dyn RegionBehavior>>,
}

impl TriggerRegion {
	fn new(spec: RegionSpec) -> Self {
		Self {
			anchor: spec.anchor,
			start: spec.start,
			end: spec.end,
			scrub: spec.scrub,
			bounds: None,
			state: RegionState::Before,
			progress: None,
			behaviors: spec.behaviors,
		}
	}

	pub fn anchor(&self) -> &str {
		&self.anchor
	}

	pub fn bounds(&self) -> Option<InterpRange<f32>> {
		self.bounds
	}

	pub fn state(&self) -> RegionState {
		self.state
	}

	/// Last reported progress.
	pub fn progress(&self) -> Option<f32> {
		self.progress
	}

	/// Recomputes the pixel bounds from the current layout. Returns false if the anchor is missing.
	fn measure<D: Document + ?Sized>(&mut self, document: &D) -> bool {
		let Some(element) = document.region_bounds(&self.anchor) else {
			self.bounds = None;
			return false;
		};
		let viewport_height = document.viewport_size().height as f32;
		let bounds = InterpRange::new(
			self.start.scroll_offset(element, viewport_height),
			self.end.scroll_offset(element, viewport_height),
		);
		debug!(
			"Region {:?} ({} to {}) spans {}..{}",
			self.anchor, self.start, self.end, bounds.beg, bounds.end
		);
		self.bounds = Some(bounds);
		true
	}

	fn evaluate(&mut self, scroll: f32, scene: &mut Scene) {
		let Some(bounds) = self.bounds else {
			return;
		};

		let progress = bounds.progress_of(scroll);
		if self.scrub && self.progress != Some(progress) {
			for behavior in &mut self.behaviors {
				behavior.on_progress(scene, progress);
			}
		}
		self.progress = Some(progress);

		let state = RegionState::at(scroll, bounds);
		for &transition in Transition::between(self.state, state) {
			debug!("Region {:?}: {:?}", self.anchor, transition);
			for behavior in &mut self.behaviors {
				behavior.on_transition(scene, transition);
			}
		}
		self.state = state;
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Scroll timeline used after detach")]
pub struct DetachedError;

/// Every trigger region of a mounted scene, in registration order.
///
/// Regions later in the list overwrite what earlier ones wrote during the same update.
pub struct ScrollTimeline {
	regions: Vec<TriggerRegion>,
	scroll_y: f32,
	attached: bool,
}

impl ScrollTimeline {
	/// Resolves the regions against `document` and applies the current scroll position.
	///
	/// Regions whose anchor is missing are logged and left out.
	pub fn attach<D: Document + ?Sized>(document: &D, scene: &mut Scene, specs: Vec<RegionSpec>) -> Self {
		let requested = specs.len();
		let mut regions = Vec::with_capacity(requested);
		for spec in specs {
			let mut region = TriggerRegion::new(spec);
			if region.measure(document) {
				regions.push(region);
			} else {
				warn!("No element with id {:?}, skipping its trigger region", region.anchor);
			}
		}
		info!("Attached {} of {} trigger regions", regions.len(), requested);

		let mut timeline = Self {
			regions,
			scroll_y: document.scroll_y(),
			attached: true,
		};
		timeline.evaluate(scene);
		timeline
	}

	fn evaluate(&mut self, scene: &mut Scene) {
		for region in &mut self.regions {
			region.evaluate(self.scroll_y, scene);
		}
	}

	pub fn is_attached(&self) -> bool {
		self.attached
	}

	fn ensure_attached(&self) -> Result<(), DetachedError> {
		if self.attached {
			Ok(())
		} else {
			error!("Scroll timeline used after detach");
			Err(DetachedError)
		}
	}

	/// Applies a new scroll offset.
	pub fn update(&mut self, scroll_y: f32, scene: &mut Scene) -> Result<(), DetachedError> {
		self.ensure_attached()?;
		self.scroll_y = scroll_y;
		self.evaluate(scene);
		Ok(())
	}

	/// Recomputes every region's bounds from the current layout, then re-applies the scroll offset.
	pub fn refresh<D: Document + ?Sized>(&mut self, document: &D, scene: &mut Scene) -> Result<(), DetachedError> {
		self.ensure_attached()?;
		for region in &mut self.regions {
			if !region.measure(document) {
				warn!("Element {:?} disappeared, its trigger region is paused", region.anchor);
			}
		}
		self.scroll_y = document.scroll_y();
		self.evaluate(scene);
		Ok(())
	}

	/// Runs the time-driven behaviors for a frame lasting `dt` seconds.
	pub fn advance(&mut self, dt: f32, scene: &mut Scene) -> Result<(), DetachedError> {
		self.ensure_attached()?;
		for region in &mut self.regions {
			let active = region.state == RegionState::Active;
			for behavior in &mut region.behaviors {
				behavior.advance(scene, dt, active);
			}
		}
		Ok(())
	}

	/// Drops every region. Returns how many there were. Safe to call again.
	pub fn detach(&mut self) -> usize {
		let count = self.regions.len();
		self.regions.clear();
		if self.attached {
			info!("Detached {} trigger regions", count);
		}
		self.attached = false;
		count
	}

	pub fn scroll_y(&self) -> f32 {
		self.scroll_y
	}

	pub fn len(&self) -> usize {
		self.regions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}

	pub fn regions(&self) -> impl Iterator<Item = &TriggerRegion> {
		self.regions.iter()
	}

	/// First region registered on `anchor`.
	pub fn region(&self, anchor: &str) -> Option<&TriggerRegion> {
		self.regions.iter().find(|region| region.anchor == anchor)
	}
}
