//! An in-memory host: a fake landing page with a controllable scroll position,
//! a manual frame clock and bookkeeping of every resource the stage acquires.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::*;

/// Anchor ids of the landing page sections, top to bottom, after a leading hero section.
pub const LANDING_SECTIONS: [&str; 4] = ["demo", "caracteristicas", "como-funciona", "planes"];

#[derive(Debug, Clone, thiserror::Error)]
pub enum SimulatedHostError {
	#[error("No graphics capability")]
	NoGraphics,
	#[error("No element with id {0:?}")]
	MissingContainer(String),
	#[error("Unknown surface {0:?}")]
	UnknownSurface(SurfaceId),
}

/// Resource operations, in the order the host saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
	CreateSurface(SurfaceId),
	AttachSurface(SurfaceId, String),
	ReleaseSurface(SurfaceId),
	DetachSurface(SurfaceId),
	AddListener(ListenerId, HostEventKind),
	RemoveListener(ListenerId),
	RequestFrame(FrameRequestId),
	CancelFrame(FrameRequestId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSurface {
	pub size: ViewportSize,
	pub container: Option<String>,
	pub released: bool,
}

pub struct SimulatedHost {
	viewport: ViewportSize,
	scroll_y: f32,
	regions: HashMap<String, RegionBounds>,
	/// Sections are laid out one viewport tall, so resizing moves them.
	landing_layout: bool,
	containers: BTreeSet<String>,
	clock_ms: f64,
	next_id: u64,
	pending_frames: BTreeSet<FrameRequestId>,
	listeners: HashMap<ListenerId, HostEventKind>,
	surfaces: HashMap<SurfaceId, SimulatedSurface>,
	calls: Vec<HostCall>,
	/// Makes the next surface creations fail, like a browser without WebGL.
	pub fail_surface_creation: bool,
}

impl SimulatedHost {
	/// A blank page with no regions and a `cap-scene` container.
	pub fn new(viewport: ViewportSize) -> Self {
		Self {
			viewport,
			scroll_y: 0.0,
			regions: HashMap::new(),
			landing_layout: false,
			containers: BTreeSet::from(["cap-scene".to_owned()]),
			clock_ms: 0.0,
			next_id: 1,
			pending_frames: BTreeSet::new(),
			listeners: HashMap::new(),
			surfaces: HashMap::new(),
			calls: Vec::new(),
			fail_surface_creation: false,
		}
	}

	/// A hero section followed by every [`LANDING_SECTIONS`] entry, each one viewport tall,
	/// and a half-viewport footer. `body` spans all of it.
	pub fn landing_page(viewport: ViewportSize) -> Self {
		let mut host = Self::new(viewport);
		host.landing_layout = true;
		host.relayout();
		host
	}

	fn relayout(&mut self) {
		let section = self.viewport.height as f32;
		for (i, anchor) in LANDING_SECTIONS.iter().enumerate() {
			let bounds = RegionBounds {
				top: section * (i + 1) as f32,
				height: section,
			};
			self.regions.insert((*anchor).to_owned(), bounds);
		}
		let body = RegionBounds {
			top: 0.0,
			height: section * (LANDING_SECTIONS.len() as f32 + 1.5),
		};
		self.regions.insert("body".to_owned(), body);
	}

	fn next_id(&mut self) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}

	pub fn set_region(&mut self, anchor: &str, bounds: RegionBounds) {
		self.regions.insert(anchor.to_owned(), bounds);
	}

	pub fn remove_region(&mut self, anchor: &str) -> Option<RegionBounds> {
		self.regions.remove(anchor)
	}

	pub fn add_container(&mut self, id: &str) {
		self.containers.insert(id.to_owned());
	}

	/// Largest reachable scroll offset.
	pub fn max_scroll(&self) -> f32 {
		let page = self.regions.get("body").map_or(0.0, |body| body.top + body.height);
		(page - self.viewport.height as f32).max(0.0)
	}

	/// Scrolls the page. Yields a scroll event if anybody listens for it.
	pub fn scroll_to(&mut self, y: f32) -> Option<HostEvent> {
		self.scroll_y = y.max(0.0);
		self.has_listener(HostEventKind::Scroll).then_some(HostEvent::Scroll)
	}

	/// Resizes the window, relaying out the landing page. Yields a resize event if anybody listens for it.
	pub fn resize_to(&mut self, viewport: ViewportSize) -> Option<HostEvent> {
		self.viewport = viewport;
		if self.landing_layout {
			self.relayout();
		}
		self.has_listener(HostEventKind::Resize)
			.then_some(HostEvent::Resize(viewport))
	}

	/// Advances the clock and delivers the oldest pending frame, if any.
	pub fn next_frame(&mut self, dt_ms: f64) -> Option<HostEvent> {
		let id = self.pending_frames.pop_first()?;
		self.clock_ms += dt_ms;
		trace!("Delivering frame {} at {} ms", id.0, self.clock_ms);
		Some(HostEvent::Frame {
			id,
			clock_ms: self.clock_ms,
		})
	}

	pub fn clock_ms(&self) -> f64 {
		self.clock_ms
	}

	pub fn pending_frame_count(&self) -> usize {
		self.pending_frames.len()
	}

	pub fn has_listener(&self, kind: HostEventKind) -> bool {
		self.listeners.values().any(|&k| k == kind)
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	pub fn surface(&self, id: SurfaceId) -> Option<&SimulatedSurface> {
		self.surfaces.get(&id)
	}

	/// Surfaces that are still attached or hold resources.
	pub fn live_surface_count(&self) -> usize {
		self.surfaces
			.values()
			.filter(|s| s.container.is_some() || !s.released)
			.count()
	}

	pub fn calls(&self) -> &[HostCall] {
		&self.calls
	}
}

impl Document for SimulatedHost {
	fn viewport_size(&self) -> ViewportSize {
		self.viewport
	}

	fn scroll_y(&self) -> f32 {
		self.scroll_y
	}

	fn region_bounds(&self, anchor: &str) -> Option<RegionBounds> {
		self.regions.get(anchor).copied()
	}
}

impl FrameScheduler for SimulatedHost {
	fn request_frame(&mut self) -> FrameRequestId {
		let id = FrameRequestId(self.next_id());
		self.pending_frames.insert(id);
		self.calls.push(HostCall::RequestFrame(id));
		id
	}

	fn cancel_frame(&mut self, id: FrameRequestId) {
		self.pending_frames.remove(&id);
		self.calls.push(HostCall::CancelFrame(id));
	}
}

impl EventSource for SimulatedHost {
	fn add_listener(&mut self, kind: HostEventKind) -> ListenerId {
		let id = ListenerId(self.next_id());
		self.listeners.insert(id, kind);
		self.calls.push(HostCall::AddListener(id, kind));
		id
	}

	fn remove_listener(&mut self, id: ListenerId) {
		self.listeners.remove(&id);
		self.calls.push(HostCall::RemoveListener(id));
	}
}

impl SurfaceBackend for SimulatedHost {
	type Error = SimulatedHostError;

	fn create_surface(&mut self, size: ViewportSize) -> Result<SurfaceId, Self::Error> {
		if self.fail_surface_creation {
			return Err(SimulatedHostError::NoGraphics);
		}
		let id = SurfaceId(self.next_id());
		self.surfaces.insert(
			id,
			SimulatedSurface {
				size,
				container: None,
				released: false,
			},
		);
		self.calls.push(HostCall::CreateSurface(id));
		Ok(id)
	}

	fn attach_surface(&mut self, surface: SurfaceId, container: &str) -> Result<(), Self::Error> {
		if !self.containers.contains(container) {
			return Err(SimulatedHostError::MissingContainer(container.to_owned()));
		}
		let entry = self
			.surfaces
			.get_mut(&surface)
			.ok_or(SimulatedHostError::UnknownSurface(surface))?;
		entry.container = Some(container.to_owned());
		self.calls.push(HostCall::AttachSurface(surface, container.to_owned()));
		Ok(())
	}

	fn resize_surface(&mut self, surface: SurfaceId, size: ViewportSize) {
		if let Some(entry) = self.surfaces.get_mut(&surface) {
			entry.size = size;
		}
	}

	fn release_surface(&mut self, surface: SurfaceId) {
		if let Some(entry) = self.surfaces.get_mut(&surface) {
			entry.released = true;
		}
		self.calls.push(HostCall::ReleaseSurface(surface));
	}

	fn detach_surface(&mut self, surface: SurfaceId) {
		if let Some(entry) = self.surfaces.get_mut(&surface) {
			entry.container = None;
		}
		self.calls.push(HostCall::DetachSurface(surface));
	}
}
