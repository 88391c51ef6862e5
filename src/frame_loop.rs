//! A display-synchronized loop on top of the host's one-shot frame requests.

use std::fmt::Display;

use tracing::{error, trace};

use crate::host::{FrameRequestId, FrameScheduler};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderLoopError {
	#[error("Render loop is already running")]
	AlreadyRunning,
}

/// Keeps exactly one frame request outstanding while running.
///
/// Only the outstanding request is honored: a frame delivered for any other id,
/// including one cancelled a moment ago, does nothing.
#[derive(Debug, Default)]
pub struct RenderLoop {
	pending: Option<FrameRequestId>,
	frames: u64,
}

impl RenderLoop {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> Result<FrameRequestId, RenderLoopError> {
		if self.pending.is_some() {
			error!("Render loop started twice, cancel it first");
			return Err(RenderLoopError::AlreadyRunning);
		}
		let id = scheduler.request_frame();
		self.pending = Some(id);
		Ok(id)
	}

	/// Stops the loop. Returns false if it was not running.
	pub fn cancel<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
		match self.pending.take() {
			Some(id) => {
				scheduler.cancel_frame(id);
				true
			}
			None => false,
		}
	}

	pub fn is_running(&self) -> bool {
		self.pending.is_some()
	}

	/// Frames run so far.
	pub fn frames(&self) -> u64 {
		self.frames
	}

	/// Runs `frame` if `id` is the outstanding request, then requests the next frame.
	///
	/// Returns `Ok(false)` for stale ids. An error from `frame` stops the loop and is returned as is.
	pub fn run_frame<S, E>(
		&mut self,
		id: FrameRequestId,
		scheduler: &mut S,
		frame: impl FnOnce() -> Result<(), E>,
	) -> Result<bool, E>
	where
		S: FrameScheduler + ?Sized,
		E: Display,
	{
		if self.pending != Some(id) {
			trace!("Ignoring stale frame {}", id.0);
			return Ok(false);
		}
		self.pending = None;
		self.frames += 1;

		match frame() {
			Ok(()) => {
				self.pending = Some(scheduler.request_frame());
				Ok(true)
			}
			Err(e) => {
				error!("Render loop stopped: {}", e);
				Err(e)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::host::simulated::SimulatedHost;
	use crate::host::{HostEvent, ViewportSize};

	use super::*;

	fn host() -> SimulatedHost {
		SimulatedHost::new(ViewportSize::new(800, 600))
	}

	fn next_id(host: &mut SimulatedHost) -> FrameRequestId {
		match host.next_frame(16.0) {
			Some(HostEvent::Frame { id, .. }) => id,
			other => panic!("expected a frame, got {other:?}"),
		}
	}

	#[test]
	fn keeps_one_request_outstanding() {
		let mut host = host();
		let mut frame_loop = RenderLoop::new();
		frame_loop.start(&mut host).unwrap();

		let mut ran = 0;
		for _ in 0..5 {
			let id = next_id(&mut host);
			let ok = frame_loop
				.run_frame(id, &mut host, || {
					ran += 1;
					Ok::<_, RenderLoopError>(())
				})
				.unwrap();
			assert!(ok);
			assert_eq!(host.pending_frame_count(), 1);
		}
		assert_eq!(ran, 5);
		assert_eq!(frame_loop.frames(), 5);
	}

	#[test]
	fn double_start_is_rejected() {
		let mut host = host();
		let mut frame_loop = RenderLoop::new();
		frame_loop.start(&mut host).unwrap();
		assert!(matches!(frame_loop.start(&mut host), Err(RenderLoopError::AlreadyRunning)));
		assert_eq!(host.pending_frame_count(), 1);
	}

	#[test]
	fn no_frame_after_cancel() {
		let mut host = host();
		let mut frame_loop = RenderLoop::new();
		let id = frame_loop.start(&mut host).unwrap();
		assert!(frame_loop.cancel(&mut host));
		assert!(!frame_loop.cancel(&mut host));

		// a frame that was already in flight when cancelled
		let ran = frame_loop
			.run_frame(id, &mut host, || -> Result<(), RenderLoopError> { panic!("frame ran after cancel") })
			.unwrap();
		assert!(!ran);
		assert_eq!(host.pending_frame_count(), 0);
		assert!(!frame_loop.is_running());

		// restartable with a fresh handle
		let fresh = frame_loop.start(&mut host).unwrap();
		assert_ne!(fresh, id);
	}

	#[test]
	fn errors_stop_the_loop() {
		let mut host = host();
		let mut frame_loop = RenderLoop::new();
		frame_loop.start(&mut host).unwrap();

		let id = next_id(&mut host);
		let result = frame_loop.run_frame(id, &mut host, || Err("context lost"));
		assert_eq!(result, Err("context lost"));
		assert!(!frame_loop.is_running());
		assert_eq!(host.pending_frame_count(), 0);
	}
}
