//! WebGL2 / OpenGL 3.3 backend.

mod gl_buffer;
mod shader;

use std::collections::HashMap;

use glam::{uvec2, vec3, Mat4, UVec2};
use glow::HasContext;
use tracing::{debug, info};

use crate::math::camera::PerspectiveCamera;
use crate::mesh::tessellate;
use crate::node::{NodeUuid, Part};
use crate::render::CapRenderer;

pub use self::shader::ShaderCompileError;
use self::gl_buffer::{setup_gl_mesh, GlMesh};
use self::shader::PartShader;

const AMBIENT_INTENSITY: f32 = 0.6;
const LIGHT_INTENSITY: f32 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum OpenglRendererError {
	#[error("Could not initialize OpenGL renderer: {0}")]
	ShaderCompile(#[from] ShaderCompileError),
	#[error("OpenGL error: {0}")]
	Opengl(String),
	#[error("Drawing outside of a frame")]
	NoFrameInProgress,
}

/// Draws every part with one lit shader, uploading each part's mesh on first use.
pub struct OpenglRenderer {
	gl: glow::Context,
	pub viewport: UVec2,
	part_shader: PartShader,
	meshes: HashMap<NodeUuid, GlMesh>,
	view_projection: Option<Mat4>,
}

impl OpenglRenderer {
	/// Compiles the shader and sets up lighting and depth testing.
	pub fn new(gl: glow::Context) -> Result<Self, OpenglRendererError> {
		let part_shader = PartShader::new(&gl)?;

		unsafe {
			gl.use_program(Some(part_shader.program));
			gl.enable(glow::DEPTH_TEST);
			// transparent, the page shows through around the model
			gl.clear_color(0.0, 0.0, 0.0, 0.0);
		}
		part_shader.set_lights(&gl, AMBIENT_INTENSITY, vec3(10.0, 10.0, 5.0), LIGHT_INTENSITY);

		info!("OpenGL renderer ready");
		Ok(Self {
			gl,
			viewport: UVec2::ZERO,
			part_shader,
			meshes: HashMap::new(),
			view_projection: None,
		})
	}

	pub fn gl(&self) -> &glow::Context {
		&self.gl
	}

	fn mesh(&mut self, id: NodeUuid, part: &Part) -> Result<&GlMesh, OpenglRendererError> {
		if !self.meshes.contains_key(&id) {
			debug!("Uploading mesh for node {}", id.raw());
			let mesh = setup_gl_mesh(&self.gl, &tessellate(&part.geometry))?;
			self.meshes.insert(id, mesh);
		}
		self.meshes
			.get(&id)
			.ok_or_else(|| OpenglRendererError::Opengl(format!("mesh {} vanished", id.raw())))
	}

	fn check_error(&self) -> Result<(), OpenglRendererError> {
		let error = unsafe { self.gl.get_error() };
		if error == glow::NO_ERROR {
			Ok(())
		} else {
			Err(OpenglRendererError::Opengl(format!("error code {error:#x}")))
		}
	}
}

impl CapRenderer for OpenglRenderer {
	type Error = OpenglRendererError;

	fn resize(&mut self, width: u32, height: u32) {
		self.viewport = uvec2(width, height);
		unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
	}

	fn begin_frame(&mut self, camera: &PerspectiveCamera) -> Result<(), Self::Error> {
		self.view_projection = Some(camera.view_projection());
		unsafe {
			self.gl.use_program(Some(self.part_shader.program));
			self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
		}
		Ok(())
	}

	fn draw_part(&mut self, id: NodeUuid, part: &Part, world: &Mat4) -> Result<(), Self::Error> {
		let view_projection = self.view_projection.ok_or(OpenglRendererError::NoFrameInProgress)?;
		let (vao, index_count) = {
			let mesh = self.mesh(id, part)?;
			(mesh.vao, mesh.index_count)
		};

		let gl = &self.gl;
		let material = &part.material;
		self.part_shader.set_transforms(gl, view_projection * *world, *world);
		self.part_shader.set_surface(
			gl,
			material.color,
			material.emissive,
			material.metalness,
			material.roughness,
		);
		unsafe {
			gl.bind_vertex_array(Some(vao));
			gl.draw_elements(glow::TRIANGLES, index_count, glow::UNSIGNED_SHORT, 0);
		}
		Ok(())
	}

	fn end_frame(&mut self) -> Result<(), Self::Error> {
		self.view_projection.take().ok_or(OpenglRendererError::NoFrameInProgress)?;
		unsafe { self.gl.bind_vertex_array(None) };
		self.check_error()
	}
}

impl Drop for OpenglRenderer {
	fn drop(&mut self) {
		for (_, mesh) in self.meshes.drain() {
			mesh.delete(&self.gl);
		}
		unsafe { self.gl.delete_program(self.part_shader.program) };
		debug!("Released OpenGL resources");
	}
}
