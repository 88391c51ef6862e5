//! What the scene needs from the page it lives in.
//!
//! A host is split into four seams: the document (layout and scroll), the frame scheduler,
//! the event listener registry and the drawing surface backend. [`Host`] is implemented for
//! anything providing all four.

pub mod simulated;

use std::fmt;

/// Window size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportSize {
	pub width: u32,
	pub height: u32,
}

impl ViewportSize {
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	pub fn is_empty(self) -> bool {
		self.width == 0 || self.height == 0
	}

	pub fn aspect(self) -> f32 {
		self.width as f32 / self.height as f32
	}
}

impl fmt::Display for ViewportSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// Vertical extent of an anchor region in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
	pub top: f32,
	pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Window signals the scene listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
	Scroll,
	Resize,
}

/// Something the host delivers to a mounted stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
	Scroll,
	Resize(ViewportSize),
	/// A previously requested animation frame, with the host clock in milliseconds.
	Frame { id: FrameRequestId, clock_ms: f64 },
}

/// How an anchor picks its element out of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor<'a> {
	/// `body`: the document body, spanning the whole page.
	Body,
	/// `html`
	Root,
	/// A bare name. Looked up as an element id, then as a selector.
	Id(&'a str),
	/// Anything else is a CSS selector, e.g. `#planes` or `main > section`.
	Selector(&'a str),
}

impl<'a> Anchor<'a> {
	pub fn parse(anchor: &'a str) -> Self {
		let anchor = anchor.trim();
		match anchor {
			"body" => Anchor::Body,
			"html" => Anchor::Root,
			_ if !anchor.is_empty()
				&& anchor.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
			{
				Anchor::Id(anchor)
			}
			_ => Anchor::Selector(anchor),
		}
	}
}

pub trait Document {
	fn viewport_size(&self) -> ViewportSize;
	/// Current vertical scroll offset of the document.
	fn scroll_y(&self) -> f32;
	/// `None` if nothing in the page matches the anchor. See [`Anchor`] for how anchors are read.
	fn region_bounds(&self, anchor: &str) -> Option<RegionBounds>;
}

/// Display-synchronized frame callbacks. Each request yields exactly one frame unless cancelled.
pub trait FrameScheduler {
	fn request_frame(&mut self) -> FrameRequestId;
	fn cancel_frame(&mut self, id: FrameRequestId);
}

pub trait EventSource {
	fn add_listener(&mut self, kind: HostEventKind) -> ListenerId;
	fn remove_listener(&mut self, id: ListenerId);
}

/// Creates drawing surfaces and places them in the page.
pub trait SurfaceBackend {
	type Error: std::error::Error + 'static;

	/// Fails when the host has no graphics capability.
	fn create_surface(&mut self, size: ViewportSize) -> Result<SurfaceId, Self::Error>;
	/// Puts the surface into the element the `container` anchor names.
	fn attach_surface(&mut self, surface: SurfaceId, container: &str) -> Result<(), Self::Error>;
	fn resize_surface(&mut self, surface: SurfaceId, size: ViewportSize);
	/// Frees the graphics resources behind the surface.
	fn release_surface(&mut self, surface: SurfaceId);
	/// Removes the surface from its container.
	fn detach_surface(&mut self, surface: SurfaceId);
}

pub trait Host: Document + FrameScheduler + EventSource + SurfaceBackend {}

impl<T: Document + FrameScheduler + EventSource + SurfaceBackend> Host for T {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn anchors() {
		assert_eq!(Anchor::parse("body"), Anchor::Body);
		assert_eq!(Anchor::parse(" body "), Anchor::Body);
		assert_eq!(Anchor::parse("html"), Anchor::Root);
		assert_eq!(Anchor::parse("como-funciona"), Anchor::Id("como-funciona"));
		assert_eq!(Anchor::parse("cap_scene"), Anchor::Id("cap_scene"));
		assert_eq!(Anchor::parse("#planes"), Anchor::Selector("#planes"));
		assert_eq!(Anchor::parse("main > section"), Anchor::Selector("main > section"));
		assert_eq!(Anchor::parse(""), Anchor::Selector(""));
	}

	#[test]
	fn page_anchor_is_the_body() {
		let sections = crate::config::SectionsConfig::default();
		assert_eq!(Anchor::parse(&sections.page.anchor), Anchor::Body);
		assert_eq!(Anchor::parse(&sections.pricing.anchor), Anchor::Id("planes"));
	}
}
