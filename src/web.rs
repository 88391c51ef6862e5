//! Browser host: the landing page's DOM, `requestAnimationFrame`, window listeners and a WebGL2 canvas.
//!
//! Host callbacks never touch the stage directly. They queue a [`HostEvent`] and wake the pump,
//! which drains the queue into [`Stage::handle_event`].

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Once;

use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

use crate::config::SceneConfig;
use crate::host::{
	Anchor, Document, EventSource, FrameRequestId, FrameScheduler, HostEvent, HostEventKind, ListenerId, RegionBounds,
	SurfaceBackend, SurfaceId, ViewportSize,
};
use crate::opengl::{OpenglRenderer, OpenglRendererError};
use crate::stage::Stage;

#[derive(Debug, thiserror::Error)]
pub enum WebHostError {
	#[error("No window or document")]
	NoWindow,
	#[error("WebGL2 is not available")]
	NoWebgl,
	#[error("No element matches {0:?}")]
	MissingContainer(String),
	#[error("Unknown surface {0:?}")]
	UnknownSurface(SurfaceId),
	#[error("JavaScript error: {0}")]
	Js(String),
}

impl From<JsValue> for WebHostError {
	fn from(value: JsValue) -> Self {
		Self::Js(format!("{value:?}"))
	}
}

type Inbox = Rc<RefCell<VecDeque<HostEvent>>>;
type Wake = Rc<dyn Fn()>;

struct WebSurface {
	canvas: HtmlCanvasElement,
	context: Option<WebGl2RenderingContext>,
}

struct PendingFrame {
	handle: i32,
	fired: Rc<RefCell<bool>>,
	callback: Closure<dyn FnMut(f64)>,
}

pub struct WebHost {
	window: web_sys::Window,
	document: web_sys::Document,
	inbox: Inbox,
	wake: Wake,
	next_id: u64,
	frames: HashMap<FrameRequestId, PendingFrame>,
	/// Callbacks that already ran. Dropped one request later, never while running.
	spent_frames: Vec<PendingFrame>,
	listeners: HashMap<ListenerId, (&'static str, Closure<dyn FnMut()>)>,
	/// Removed listeners. A pump running inside one may be the one removing it.
	spent_listeners: Vec<Closure<dyn FnMut()>>,
	surfaces: HashMap<SurfaceId, WebSurface>,
}

impl WebHost {
	pub fn new(inbox: Inbox, wake: Wake) -> Result<Self, WebHostError> {
		let window = web_sys::window().ok_or(WebHostError::NoWindow)?;
		let document = window.document().ok_or(WebHostError::NoWindow)?;
		Ok(Self {
			window,
			document,
			inbox,
			wake,
			next_id: 1,
			frames: HashMap::new(),
			spent_frames: Vec::new(),
			listeners: HashMap::new(),
			spent_listeners: Vec::new(),
			surfaces: HashMap::new(),
		})
	}

	fn next_id(&mut self) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}

	/// The WebGL2 context of a live surface.
	pub fn webgl_context(&self, surface: SurfaceId) -> Option<WebGl2RenderingContext> {
		self.surfaces.get(&surface).and_then(|s| s.context.clone())
	}

	fn element(&self, anchor: &str) -> Option<web_sys::Element> {
		match Anchor::parse(anchor) {
			Anchor::Body => self
				.document
				.body()
				.map(Into::into)
				.or_else(|| self.document.document_element()),
			Anchor::Root => self.document.document_element(),
			Anchor::Id(id) => self.document.get_element_by_id(id).or_else(|| self.select(id)),
			Anchor::Selector(selector) => self.select(selector),
		}
	}

	fn select(&self, selector: &str) -> Option<web_sys::Element> {
		match self.document.query_selector(selector) {
			Ok(element) => element,
			Err(e) => {
				warn!("Invalid selector {:?}: {:?}", selector, e);
				None
			}
		}
	}

	fn queue(&self, event: HostEvent) -> impl Fn() + 'static {
		let inbox = self.inbox.clone();
		let wake = self.wake.clone();
		move || {
			inbox.borrow_mut().push_back(event);
			wake();
		}
	}
}

impl Document for WebHost {
	fn viewport_size(&self) -> ViewportSize {
		let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
		ViewportSize::new(dimension(self.window.inner_width()), dimension(self.window.inner_height()))
	}

	fn scroll_y(&self) -> f32 {
		self.window.scroll_y().unwrap_or(0.0) as f32
	}

	fn region_bounds(&self, anchor: &str) -> Option<RegionBounds> {
		let element = self.element(anchor)?;
		let rect = element.get_bounding_client_rect();
		Some(RegionBounds {
			top: (rect.top() + self.window.scroll_y().unwrap_or(0.0)) as f32,
			height: rect.height() as f32,
		})
	}
}

impl FrameScheduler for WebHost {
	fn request_frame(&mut self) -> FrameRequestId {
		let id = FrameRequestId(self.next_id());

		self.spent_frames.clear();
		let fired: Vec<FrameRequestId> = self
			.frames
			.iter()
			.filter(|(_, frame)| *frame.fired.borrow())
			.map(|(id, _)| *id)
			.collect();
		for fired_id in fired {
			if let Some(frame) = self.frames.remove(&fired_id) {
				self.spent_frames.push(frame);
			}
		}

		let fired = Rc::new(RefCell::new(false));
		let callback = {
			let fired = fired.clone();
			let inbox = self.inbox.clone();
			let wake = self.wake.clone();
			Closure::<dyn FnMut(f64)>::new(move |clock_ms: f64| {
				*fired.borrow_mut() = true;
				inbox.borrow_mut().push_back(HostEvent::Frame { id, clock_ms });
				wake();
			})
		};
		match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
			Ok(handle) => {
				self.frames.insert(id, PendingFrame { handle, fired, callback });
			}
			Err(e) => error!("Couldn't register `requestAnimationFrame`: {:?}", e),
		}
		id
	}

	fn cancel_frame(&mut self, id: FrameRequestId) {
		if let Some(frame) = self.frames.remove(&id) {
			if !*frame.fired.borrow() {
				if let Err(e) = self.window.cancel_animation_frame(frame.handle) {
					warn!("Couldn't cancel animation frame: {:?}", e);
				}
			}
			self.spent_frames.push(frame);
		}
	}
}

impl EventSource for WebHost {
	fn add_listener(&mut self, kind: HostEventKind) -> ListenerId {
		let id = ListenerId(self.next_id());
		let (name, callback): (&'static str, Closure<dyn FnMut()>) = match kind {
			HostEventKind::Scroll => ("scroll", Closure::new(self.queue(HostEvent::Scroll))),
			HostEventKind::Resize => {
				let window = self.window.clone();
				let inbox = self.inbox.clone();
				let wake = self.wake.clone();
				(
					"resize",
					Closure::new(move || {
						let dimension =
							|value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
						let size = ViewportSize::new(dimension(window.inner_width()), dimension(window.inner_height()));
						inbox.borrow_mut().push_back(HostEvent::Resize(size));
						wake();
					}),
				)
			}
		};
		if let Err(e) = self
			.window
			.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
		{
			error!("Couldn't listen to {}: {:?}", name, e);
		}
		self.listeners.insert(id, (name, callback));
		id
	}

	fn remove_listener(&mut self, id: ListenerId) {
		if let Some((name, callback)) = self.listeners.remove(&id) {
			if let Err(e) = self
				.window
				.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
			{
				warn!("Couldn't stop listening to {}: {:?}", name, e);
			}
			self.spent_listeners.push(callback);
		}
	}
}

impl SurfaceBackend for WebHost {
	type Error = WebHostError;

	fn create_surface(&mut self, size: ViewportSize) -> Result<SurfaceId, Self::Error> {
		let canvas = self
			.document
			.create_element("canvas")?
			.dyn_into::<HtmlCanvasElement>()
			.map_err(|_| WebHostError::Js("created element is not a canvas".to_owned()))?;
		canvas.set_width(size.width);
		canvas.set_height(size.height);

		// an overlay: fills its container and lets pointer events through
		let style = canvas.style();
		style.set_property("display", "block")?;
		style.set_property("width", "100%")?;
		style.set_property("height", "100%")?;
		style.set_property("pointer-events", "none")?;

		let options = js_sys::Object::new();
		js_sys::Reflect::set(&options, &"alpha".into(), &true.into())?;
		js_sys::Reflect::set(&options, &"antialias".into(), &true.into())?;
		let context = canvas
			.get_context_with_context_options("webgl2", &options)?
			.ok_or(WebHostError::NoWebgl)?
			.dyn_into::<WebGl2RenderingContext>()
			.map_err(|_| WebHostError::NoWebgl)?;

		let id = SurfaceId(self.next_id());
		self.surfaces.insert(
			id,
			WebSurface {
				canvas,
				context: Some(context),
			},
		);
		Ok(id)
	}

	fn attach_surface(&mut self, surface: SurfaceId, container: &str) -> Result<(), Self::Error> {
		let parent = self
			.element(container)
			.ok_or_else(|| WebHostError::MissingContainer(container.to_owned()))?;
		let entry = self.surfaces.get(&surface).ok_or(WebHostError::UnknownSurface(surface))?;
		parent.append_child(&entry.canvas)?;
		Ok(())
	}

	fn resize_surface(&mut self, surface: SurfaceId, size: ViewportSize) {
		if let Some(entry) = self.surfaces.get(&surface) {
			entry.canvas.set_width(size.width);
			entry.canvas.set_height(size.height);
		}
	}

	fn release_surface(&mut self, surface: SurfaceId) {
		if let Some(entry) = self.surfaces.get_mut(&surface) {
			entry.context = None;
		}
	}

	fn detach_surface(&mut self, surface: SurfaceId) {
		if let Some(entry) = self.surfaces.remove(&surface) {
			entry.canvas.remove();
		}
	}
}

type StageSlot = Rc<RefCell<Option<Stage<WebHost, OpenglRenderer>>>>;

/// Feeds queued host events to the stage.
///
/// Events arriving while the stage is busy stay queued for the pump already running.
fn pump(slot: &StageSlot, inbox: &Inbox) {
	let Ok(mut guard) = slot.try_borrow_mut() else {
		return;
	};
	let Some(stage) = guard.as_mut() else {
		inbox.borrow_mut().clear();
		return;
	};
	if !stage.is_mounted() {
		inbox.borrow_mut().clear();
		return;
	}
	loop {
		let Some(event) = inbox.borrow_mut().pop_front() else {
			break;
		};
		match stage.handle_event(event) {
			Ok(()) => {}
			Err(e) if e.is_fatal() => {
				error!("{}, removing the cap scene", e);
				// the torn-down stage stays in the slot: its host may be running this very callback
				stage.unmount();
				inbox.borrow_mut().clear();
				break;
			}
			Err(e) => error!("{}", e),
		}
	}
}

fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		console_error_panic_hook::set_once();
		tracing_wasm::set_as_global_default();
	});
}

/// The cap scene mounted on a page, as seen from JavaScript.
#[wasm_bindgen]
pub struct CapScene {
	stage: StageSlot,
}

#[wasm_bindgen]
impl CapScene {
	/// Mounts the scene into the element with id `container`, optionally configured by a JSON document.
	#[wasm_bindgen(constructor)]
	pub fn mount(container: Option<String>, config_json: Option<String>) -> Result<CapScene, JsValue> {
		init_logging();

		let mut config = match config_json {
			Some(text) => SceneConfig::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?,
			None => SceneConfig::default(),
		};
		if let Some(container) = container {
			config.container = container;
		}

		let slot: StageSlot = Rc::new(RefCell::new(None));
		let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
		let wake: Wake = {
			let slot = slot.clone();
			let inbox = inbox.clone();
			Rc::new(move || pump(&slot, &inbox))
		};

		let host = WebHost::new(inbox, wake).map_err(|e| JsValue::from_str(&e.to_string()))?;
		let stage = Stage::mount(host, config, |host, surface| {
			let context = host
				.webgl_context(surface.id)
				.ok_or_else(|| OpenglRendererError::Opengl("surface has no WebGL2 context".to_owned()))?;
			OpenglRenderer::new(glow::Context::from_webgl2_context(context))
		})
		.map_err(|e| JsValue::from_str(&e.to_string()))?;

		info!("Cap scene running");
		*slot.borrow_mut() = Some(stage);
		Ok(CapScene { stage: slot })
	}

	/// Stops rendering and removes every listener and the canvas. Safe to call more than once.
	pub fn unmount(&self) {
		let stage = self.stage.borrow_mut().take();
		if let Some(mut stage) = stage {
			stage.unmount();
		}
	}
}

impl Drop for CapScene {
	fn drop(&mut self) {
		self.unmount();
	}
}
