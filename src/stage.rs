//! Mounting and unmounting the whole scene on a host.
//!
//! Every resource acquired while mounting pushes a release token. Unmounting pops them in
//! reverse, so teardown mirrors setup exactly and also covers a mount that failed halfway.

use tracing::{error, info, trace, warn};

use crate::config::SceneConfig;
use crate::frame_loop::{RenderLoop, RenderLoopError};
use crate::host::{FrameRequestId, Host, HostEvent, HostEventKind, ListenerId, SurfaceBackend, ViewportSize};
use crate::idle::IdleAnimator;
use crate::model::build_cap;
use crate::render::{self, CapRenderer};
use crate::scene::Scene;
use crate::scroll::choreography::cap_choreography;
use crate::scroll::ScrollTimeline;
use crate::viewport::{self, Surface, ViewportError};

#[derive(Debug, thiserror::Error)]
pub enum StageError<S: std::error::Error + 'static, R: std::error::Error + 'static> {
	#[error(transparent)]
	Viewport(#[from] ViewportError<S>),
	#[error("Could not create the renderer: {0}")]
	Renderer(#[source] R),
	#[error("Rendering failed: {0}")]
	Render(#[source] R),
	#[error(transparent)]
	RenderLoop(#[from] RenderLoopError),
	#[error("Stage is already mounted")]
	AlreadyMounted,
	#[error("Stage is not mounted yet")]
	NotMounted,
	#[error("Stage used after unmount")]
	TornDown,
}

impl<S: std::error::Error + 'static, R: std::error::Error + 'static> StageError<S, R> {
	/// The stage can no longer draw. The host should unmount it and mount a fresh one if it wants the layer back.
	pub fn is_fatal(&self) -> bool {
		matches!(self, StageError::Render(_))
	}
}

/// `StageError` for a given host and renderer.
pub type StageErrorOf<H, R> = StageError<<H as SurfaceBackend>::Error, <R as CapRenderer>::Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
	Idle,
	Mounted,
	TornDown,
}

/// Undo step for one acquired resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
	DetachSurface,
	/// Drops the renderer and frees the surface's graphics resources.
	ReleaseSurface,
	RemoveResizeListener(ListenerId),
	/// Detaches every trigger region and the scroll listener feeding them.
	DetachTimeline { scroll_listener: ListenerId },
	CancelRenderLoop,
}

/// The mounted scene: model, camera, both animation drivers, the render loop and the surface.
pub struct Stage<H: Host, R: CapRenderer> {
	host: H,
	config: SceneConfig,
	scene: Scene,
	idle: IdleAnimator,
	timeline: Option<ScrollTimeline>,
	frame_loop: RenderLoop,
	surface: Option<Surface>,
	renderer: Option<R>,
	release: Vec<Release>,
	state: StageState,
	last_clock: Option<f64>,
}

impl<H: Host, R: CapRenderer> Stage<H, R> {
	/// Builds the model and camera without touching the host.
	pub fn new(host: H, config: SceneConfig) -> Self {
		let size = host.viewport_size();
		let aspect = if size.is_empty() { 1.0 } else { size.aspect() };
		let scene = Scene::new(build_cap(), config.camera.build(aspect));
		let idle = IdleAnimator::new(config.idle.clone());

		Self {
			host,
			config,
			scene,
			idle,
			timeline: None,
			frame_loop: RenderLoop::new(),
			surface: None,
			renderer: None,
			release: Vec::new(),
			state: StageState::Idle,
			last_clock: None,
		}
	}

	/// Builds and starts a stage in one go.
	pub fn mount(
		host: H,
		config: SceneConfig,
		make_renderer: impl FnOnce(&mut H, &Surface) -> Result<R, R::Error>,
	) -> Result<Self, StageErrorOf<H, R>> {
		let mut stage = Self::new(host, config);
		stage.start(make_renderer)?;
		Ok(stage)
	}

	/// Mounts the surface, creates the renderer, registers the listeners,
	/// attaches the scroll timeline and starts the render loop, in that order.
	///
	/// On failure everything acquired so far is released again and the stage stays unmounted.
	pub fn start(
		&mut self,
		make_renderer: impl FnOnce(&mut H, &Surface) -> Result<R, R::Error>,
	) -> Result<(), StageErrorOf<H, R>> {
		match self.state {
			StageState::Idle => {}
			StageState::Mounted => {
				error!("Stage mounted twice");
				return Err(StageError::AlreadyMounted);
			}
			StageState::TornDown => {
				error!("Cannot remount a stage that was unmounted");
				return Err(StageError::TornDown);
			}
		}

		if let Err(e) = self.acquire(make_renderer) {
			warn!("Mounting failed, releasing {} resources: {}", self.release.len(), e);
			self.unwind();
			return Err(e);
		}

		self.state = StageState::Mounted;
		info!("Stage mounted in {:?}", self.config.container);
		Ok(())
	}

	fn acquire(
		&mut self,
		make_renderer: impl FnOnce(&mut H, &Surface) -> Result<R, R::Error>,
	) -> Result<(), StageErrorOf<H, R>> {
		let size = self.host.viewport_size();
		let surface = viewport::mount(&mut self.host, &self.config.container, size)?;
		let surface = self.surface.insert(surface);
		self.release.push(Release::DetachSurface);
		self.release.push(Release::ReleaseSurface);

		let mut renderer = make_renderer(&mut self.host, surface).map_err(StageError::Renderer)?;
		renderer.resize(size.width, size.height);
		self.renderer = Some(renderer);
		if !size.is_empty() {
			self.scene.camera.set_aspect(size.aspect());
		}

		let resize_listener = self.host.add_listener(HostEventKind::Resize);
		self.release.push(Release::RemoveResizeListener(resize_listener));

		let specs = cap_choreography(&self.config.sections, &self.scene.model);
		self.timeline = Some(ScrollTimeline::attach(&self.host, &mut self.scene, specs));
		let scroll_listener = self.host.add_listener(HostEventKind::Scroll);
		self.release.push(Release::DetachTimeline { scroll_listener });

		self.frame_loop.start(&mut self.host)?;
		self.release.push(Release::CancelRenderLoop);
		Ok(())
	}

	fn unwind(&mut self) -> usize {
		let count = self.release.len();
		while let Some(token) = self.release.pop() {
			self.release_one(token);
		}
		count
	}

	fn release_one(&mut self, token: Release) {
		trace!("Releasing {:?}", token);
		match token {
			Release::CancelRenderLoop => {
				self.frame_loop.cancel(&mut self.host);
			}
			Release::DetachTimeline { scroll_listener } => {
				if let Some(mut timeline) = self.timeline.take() {
					timeline.detach();
				}
				self.host.remove_listener(scroll_listener);
			}
			Release::RemoveResizeListener(listener) => self.host.remove_listener(listener),
			Release::ReleaseSurface => {
				self.renderer = None;
				if let Some(surface) = &self.surface {
					viewport::release(&mut self.host, surface);
				}
			}
			Release::DetachSurface => {
				if let Some(surface) = self.surface.take() {
					viewport::detach(&mut self.host, &surface);
				}
			}
		}
	}

	/// Tears everything down in reverse setup order. Safe to call any number of times.
	///
	/// Returns false if there was nothing left to release.
	pub fn unmount(&mut self) -> bool {
		let released = self.unwind();
		let was_mounted = self.state == StageState::Mounted;
		self.state = StageState::TornDown;
		if was_mounted {
			info!("Stage unmounted, released {} resources", released);
		}
		released > 0
	}

	fn ensure_mounted(&self) -> Result<(), StageErrorOf<H, R>> {
		match self.state {
			StageState::Mounted => Ok(()),
			StageState::Idle => {
				error!("Stage used before mounting");
				Err(StageError::NotMounted)
			}
			StageState::TornDown => {
				error!("Stage used after unmount");
				Err(StageError::TornDown)
			}
		}
	}

	/// Reacts to something the host delivered.
	pub fn handle_event(&mut self, event: HostEvent) -> Result<(), StageErrorOf<H, R>> {
		self.ensure_mounted()?;
		match event {
			HostEvent::Scroll => self.on_scroll(),
			HostEvent::Resize(size) => self.on_resize(size),
			HostEvent::Frame { id, clock_ms } => self.on_frame(id, clock_ms),
		}
	}

	fn on_scroll(&mut self) -> Result<(), StageErrorOf<H, R>> {
		let scroll_y = self.host.scroll_y();
		let timeline = self.timeline.as_mut().ok_or(StageError::TornDown)?;
		timeline
			.update(scroll_y, &mut self.scene)
			.map_err(|_| StageError::TornDown)
	}

	fn on_resize(&mut self, size: ViewportSize) -> Result<(), StageErrorOf<H, R>> {
		let surface = self.surface.as_mut().ok_or(StageError::TornDown)?;
		if !viewport::resize(&mut self.host, surface, &mut self.scene.camera, size) {
			return Ok(());
		}
		if let Some(renderer) = &mut self.renderer {
			renderer.resize(size.width, size.height);
		}
		// layout changed: every region's pixel bounds are stale
		let timeline = self.timeline.as_mut().ok_or(StageError::TornDown)?;
		timeline
			.refresh(&self.host, &mut self.scene)
			.map_err(|_| StageError::TornDown)
	}

	fn on_frame(&mut self, id: FrameRequestId, clock_ms: f64) -> Result<(), StageErrorOf<H, R>> {
		let Self {
			host,
			scene,
			idle,
			timeline,
			frame_loop,
			renderer,
			last_clock,
			..
		} = self;
		let (Some(timeline), Some(renderer)) = (timeline.as_mut(), renderer.as_mut()) else {
			return Err(StageError::TornDown);
		};

		frame_loop.run_frame(id, host, || -> Result<(), StageErrorOf<H, R>> {
			let dt = last_clock.map_or(0.0, |last| ((clock_ms - last) / 1000.0).max(0.0) as f32);
			*last_clock = Some(clock_ms);

			idle.tick(&mut scene.model, clock_ms);
			timeline.advance(dt, scene).map_err(|_| StageError::TornDown)?;
			let drawn = render::draw(renderer, scene).map_err(StageError::Render)?;
			trace!("Drew {} parts at {} ms", drawn, clock_ms);
			Ok(())
		})?;
		Ok(())
	}

	pub fn is_mounted(&self) -> bool {
		self.state == StageState::Mounted
	}

	/// Whether a frame is scheduled.
	pub fn is_rendering(&self) -> bool {
		self.frame_loop.is_running()
	}

	pub fn config(&self) -> &SceneConfig {
		&self.config
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn timeline(&self) -> Option<&ScrollTimeline> {
		self.timeline.as_ref()
	}

	pub fn surface(&self) -> Option<&Surface> {
		self.surface.as_ref()
	}

	pub fn renderer(&self) -> Option<&R> {
		self.renderer.as_ref()
	}

	pub fn renderer_mut(&mut self) -> Option<&mut R> {
		self.renderer.as_mut()
	}
}

impl<H: Host, R: CapRenderer> Drop for Stage<H, R> {
	fn drop(&mut self) {
		self.unmount();
	}
}

#[cfg(test)]
mod tests {
	use glam::{vec3, Vec3};

	use crate::host::simulated::{HostCall, SimulatedHost, SimulatedHostError};
	use crate::math::interp::InterpRange;
	use crate::renderless::{RenderlessError, RenderlessRenderer};

	use super::*;

	type TestStage = Stage<SimulatedHost, RenderlessRenderer>;

	fn renderless(host: &mut SimulatedHost, surface: &Surface) -> Result<RenderlessRenderer, RenderlessError> {
		assert!(host.surface(surface.id).is_some());
		Ok(RenderlessRenderer::new(surface.size.width, surface.size.height))
	}

	fn mounted() -> TestStage {
		let host = SimulatedHost::landing_page(ViewportSize::new(1600, 1000));
		Stage::mount(host, SceneConfig::default(), renderless).unwrap()
	}

	fn pump_frame(stage: &mut TestStage) -> Result<(), StageErrorOf<SimulatedHost, RenderlessRenderer>> {
		let frame = stage.host_mut().next_frame(16.0).expect("a frame is pending");
		stage.handle_event(frame)
	}

	#[test]
	fn mount_acquires_everything() {
		let stage = mounted();
		let host = stage.host();

		assert!(stage.is_mounted());
		assert!(stage.is_rendering());
		assert_eq!(host.listener_count(), 2);
		assert_eq!(host.pending_frame_count(), 1);
		assert_eq!(host.live_surface_count(), 1);
		assert_eq!(stage.timeline().unwrap().len(), 7);
		assert_eq!(stage.scene().camera.aspect, 1.6);
		// global choreography applied at scroll 0
		assert_eq!(stage.scene().camera.position, vec3(3.0, 3.0, 8.0));
	}

	#[test]
	fn frames_tick_idle_then_draw() {
		let mut stage = mounted();
		for _ in 0..3 {
			pump_frame(&mut stage).unwrap();
		}

		let renderer = stage.renderer().unwrap();
		assert_eq!(renderer.frame_count(), 3);
		assert_eq!(renderer.last_frame().unwrap().draws.len(), 4);
		let rotation = stage.scene().model.transform().rotation;
		assert!(rotation.abs_diff_eq(Vec3::new(0.008, 0.012, 0.005) * 3.0, 1e-6), "{rotation}");
		assert_eq!(stage.host().pending_frame_count(), 1);
	}

	#[test]
	fn scroll_reveals_internal_system() {
		let mut stage = mounted();
		let event = stage.host_mut().scroll_to(3000.0).unwrap();
		stage.handle_event(event).unwrap();
		assert!(stage.scene().model.internal_system_visible());

		pump_frame(&mut stage).unwrap();
		assert_eq!(stage.renderer().unwrap().last_frame().unwrap().draws.len(), 10);

		let event = stage.host_mut().scroll_to(0.0).unwrap();
		stage.handle_event(event).unwrap();
		assert!(!stage.scene().model.internal_system_visible());
	}

	#[test]
	fn resize_updates_camera_renderer_and_bounds() {
		let mut stage = mounted();
		let event = stage.host_mut().resize_to(ViewportSize::new(800, 500)).unwrap();
		stage.handle_event(event).unwrap();

		assert_eq!(stage.scene().camera.aspect, 800.0 / 500.0);
		assert_eq!(stage.renderer().unwrap().viewport(), (800, 500));
		assert_eq!(stage.surface().unwrap().size, ViewportSize::new(800, 500));
		let region = stage.timeline().unwrap().region("como-funciona").unwrap();
		assert_eq!(region.bounds(), Some(InterpRange::new(1100.0, 1900.0)));

		// an empty window changes nothing
		stage.handle_event(HostEvent::Resize(ViewportSize::new(0, 0))).unwrap();
		assert_eq!(stage.scene().camera.aspect, 800.0 / 500.0);
	}

	#[test]
	fn unmount_is_idempotent_and_reversed() {
		let mut stage = mounted();
		pump_frame(&mut stage).unwrap();

		assert!(stage.unmount());
		assert!(!stage.unmount());

		let host = stage.host();
		assert_eq!(host.listener_count(), 0);
		assert_eq!(host.pending_frame_count(), 0);
		assert_eq!(host.live_surface_count(), 0);
		assert!(!stage.is_rendering());
		assert!(stage.timeline().is_none());
		assert!(stage.renderer().is_none());

		let calls = host.calls();
		let teardown = &calls[calls.len() - 5..];
		assert!(matches!(
			teardown,
			[
				HostCall::CancelFrame(_),
				HostCall::RemoveListener(_),
				HostCall::RemoveListener(_),
				HostCall::ReleaseSurface(_),
				HostCall::DetachSurface(_)
			]
		));
		// the scroll listener was registered last, so it goes first
		let listeners: Vec<HostCall> = calls
			.iter()
			.filter(|call| matches!(call, HostCall::AddListener(..)))
			.cloned()
			.collect();
		match (&listeners[..], &teardown[1]) {
			([_, HostCall::AddListener(scroll, HostEventKind::Scroll)], HostCall::RemoveListener(removed)) => {
				assert_eq!(scroll, removed)
			}
			other => panic!("unexpected listener calls {other:?}"),
		}
	}

	#[test]
	fn events_after_unmount_are_rejected() {
		let mut stage = mounted();
		let frame = stage.host_mut().next_frame(16.0).unwrap();
		stage.unmount();

		assert!(matches!(stage.handle_event(frame), Err(StageError::TornDown)));
		assert!(matches!(stage.handle_event(HostEvent::Scroll), Err(StageError::TornDown)));
		assert_eq!(stage.host().pending_frame_count(), 0);
		assert!(matches!(stage.start(renderless), Err(StageError::TornDown)));
	}

	#[test]
	fn stale_frames_are_ignored() {
		let mut stage = mounted();
		let first = stage.host_mut().next_frame(16.0).unwrap();
		stage.handle_event(first).unwrap();
		// delivered again, e.g. by a confused host
		stage.handle_event(first).unwrap();

		assert_eq!(stage.renderer().unwrap().frame_count(), 1);
		assert_eq!(stage.host().pending_frame_count(), 1);
	}

	#[test]
	fn failing_renderer_unwinds_the_surface() {
		let host = SimulatedHost::landing_page(ViewportSize::new(1600, 1000));
		let mut stage: TestStage = Stage::new(host, SceneConfig::default());
		let result = stage.start(|_, _| Err(RenderlessError::ContextLost));

		assert!(matches!(result, Err(StageError::Renderer(RenderlessError::ContextLost))));
		assert!(!stage.is_mounted());
		let host = stage.host();
		assert_eq!(host.live_surface_count(), 0);
		assert_eq!(host.listener_count(), 0);
		assert_eq!(host.pending_frame_count(), 0);
		assert!(matches!(
			host.calls(),
			[
				HostCall::CreateSurface(_),
				HostCall::AttachSurface(..),
				HostCall::ReleaseSurface(_),
				HostCall::DetachSurface(_)
			]
		));

		// not mounted, so events are misuse
		assert!(matches!(stage.handle_event(HostEvent::Scroll), Err(StageError::NotMounted)));
		// and a retry can still succeed
		stage.start(renderless).unwrap();
		assert!(stage.is_mounted());
	}

	#[test]
	fn no_graphics_is_reported() {
		let mut host = SimulatedHost::landing_page(ViewportSize::new(1600, 1000));
		host.fail_surface_creation = true;
		let mut stage: TestStage = Stage::new(host, SceneConfig::default());

		assert!(matches!(
			stage.start(renderless),
			Err(StageError::Viewport(ViewportError::Create(SimulatedHostError::NoGraphics)))
		));
		assert!(stage.host().calls().is_empty());
	}

	#[test]
	fn missing_container_is_reported() {
		let host = SimulatedHost::landing_page(ViewportSize::new(1600, 1000));
		let config = SceneConfig {
			container: "nowhere".to_owned(),
			..Default::default()
		};
		let result = Stage::mount(host, config, renderless);
		assert!(matches!(result, Err(StageError::Viewport(ViewportError::Attach { .. }))));
	}

	#[test]
	fn double_start_is_rejected() {
		let mut stage = mounted();
		assert!(matches!(stage.start(renderless), Err(StageError::AlreadyMounted)));
		assert_eq!(stage.host().pending_frame_count(), 1);
	}

	#[test]
	fn render_errors_stop_the_loop() {
		let mut stage = mounted();
		stage.renderer_mut().unwrap().lose_context = true;

		assert!(matches!(
			pump_frame(&mut stage),
			Err(StageError::Render(RenderlessError::ContextLost))
		));
		assert!(!stage.is_rendering());
		assert_eq!(stage.host().pending_frame_count(), 0);
		// still mounted: the host decides to remount
		assert!(stage.is_mounted());
		assert!(stage.unmount());
	}

	#[test]
	fn lost_context_is_fatal_and_unmount_clears_the_page() {
		let mut stage = mounted();
		stage.renderer_mut().unwrap().lose_context = true;

		let err = pump_frame(&mut stage).unwrap_err();
		assert!(err.is_fatal());

		// a scroll alone would keep the stage alive with nothing drawing
		let event = stage.host_mut().scroll_to(500.0).unwrap();
		stage.handle_event(event).unwrap();
		assert_eq!(stage.host().listener_count(), 2);
		assert_eq!(stage.host().live_surface_count(), 1);

		assert!(stage.unmount());
		assert_eq!(stage.host().listener_count(), 0);
		assert_eq!(stage.host().pending_frame_count(), 0);
		assert_eq!(stage.host().live_surface_count(), 0);

		assert!(stage.host_mut().scroll_to(0.0).is_none());
	}

	#[test]
	fn misuse_is_not_fatal() {
		let host = SimulatedHost::landing_page(ViewportSize::new(1024, 768));
		let mut stage: TestStage = Stage::new(host, SceneConfig::default());
		let err = stage.handle_event(HostEvent::Scroll).unwrap_err();
		assert!(matches!(err, StageError::NotMounted));
		assert!(!err.is_fatal());
	}

	#[test]
	fn page_without_sections_still_mounts() {
		let host = SimulatedHost::new(ViewportSize::new(1024, 768));
		let mut stage: TestStage = Stage::mount(host, SceneConfig::default(), renderless).unwrap();

		assert!(stage.timeline().unwrap().is_empty());
		pump_frame(&mut stage).unwrap();
		assert_eq!(stage.renderer().unwrap().frame_count(), 1);
	}
}
