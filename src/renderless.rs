//! A renderer that draws nothing and remembers everything it was asked to draw.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use tracing::trace;

use crate::math::camera::PerspectiveCamera;
use crate::mesh::{tessellate, Mesh};
use crate::node::{NodeUuid, Part};
use crate::render::CapRenderer;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderlessError {
	#[error("Drawing context lost")]
	ContextLost,
	#[error("end_frame() without begin_frame()")]
	NoFrameInProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
	pub id: NodeUuid,
	pub world: Mat4,
	pub emissive: Vec3,
	pub triangles: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
	pub view_projection: Mat4,
	pub draws: Vec<DrawCall>,
}

#[derive(Default)]
pub struct RenderlessRenderer {
	viewport: (u32, u32),
	meshes: HashMap<NodeUuid, Mesh>,
	current: Option<Frame>,
	last: Option<Frame>,
	frames: u64,
	/// Makes every following call fail, like a lost WebGL context.
	pub lose_context: bool,
}

impl RenderlessRenderer {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			viewport: (width, height),
			..Default::default()
		}
	}

	pub fn viewport(&self) -> (u32, u32) {
		self.viewport
	}

	/// Last completed frame.
	pub fn last_frame(&self) -> Option<&Frame> {
		self.last.as_ref()
	}

	pub fn frame_count(&self) -> u64 {
		self.frames
	}

	/// Number of distinct parts tessellated so far.
	pub fn mesh_count(&self) -> usize {
		self.meshes.len()
	}

	fn check_context(&self) -> Result<(), RenderlessError> {
		if self.lose_context {
			Err(RenderlessError::ContextLost)
		} else {
			Ok(())
		}
	}
}

impl CapRenderer for RenderlessRenderer {
	type Error = RenderlessError;

	fn resize(&mut self, width: u32, height: u32) {
		self.viewport = (width, height);
	}

	fn begin_frame(&mut self, camera: &PerspectiveCamera) -> Result<(), Self::Error> {
		self.check_context()?;
		self.current = Some(Frame {
			view_projection: camera.view_projection(),
			draws: Vec::new(),
		});
		Ok(())
	}

	fn draw_part(&mut self, id: NodeUuid, part: &Part, world: &Mat4) -> Result<(), Self::Error> {
		self.check_context()?;
		let frame = self.current.as_mut().ok_or(RenderlessError::NoFrameInProgress)?;
		let mesh = self.meshes.entry(id).or_insert_with(|| tessellate(&part.geometry));
		frame.draws.push(DrawCall {
			id,
			world: *world,
			emissive: part.material.emissive,
			triangles: mesh.triangle_count(),
		});
		Ok(())
	}

	fn end_frame(&mut self) -> Result<(), Self::Error> {
		self.check_context()?;
		let frame = self.current.take().ok_or(RenderlessError::NoFrameInProgress)?;
		trace!("Frame {} with {} draws", self.frames, frame.draws.len());
		self.last = Some(frame);
		self.frames += 1;
		Ok(())
	}
}
