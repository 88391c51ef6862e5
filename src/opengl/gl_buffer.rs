use glow::HasContext;

use crate::mesh::Mesh;

use super::OpenglRendererError;

/// Create and BIND an OpenGL buffer and upload data.
///
/// # Safety
///
/// `target` and `usage` must be valid OpenGL constants.
unsafe fn upload_array_to_gl<T: bytemuck::Pod>(
	gl: &glow::Context,
	array: &[T],
	target: u32,
	usage: u32,
) -> Result<glow::Buffer, OpenglRendererError> {
	let buffer = gl.create_buffer().map_err(OpenglRendererError::Opengl)?;
	gl.bind_buffer(target, Some(buffer));
	gl.buffer_data_u8_slice(target, bytemuck::cast_slice(array), usage);

	Ok(buffer)
}

/// GPU copy of one part's mesh.
pub struct GlMesh {
	pub vao: glow::VertexArray,
	buffers: [glow::Buffer; 3],
	pub index_count: i32,
}

impl GlMesh {
	pub fn delete(self, gl: &glow::Context) {
		unsafe {
			gl.delete_vertex_array(self.vao);
			for buffer in self.buffers {
				gl.delete_buffer(buffer);
			}
		}
	}
}

/// Create a vertex array with position, normal and index buffers and upload the mesh into them.
pub fn setup_gl_mesh(gl: &glow::Context, mesh: &Mesh) -> Result<GlMesh, OpenglRendererError> {
	unsafe {
		let vao = gl.create_vertex_array().map_err(OpenglRendererError::Opengl)?;
		gl.bind_vertex_array(Some(vao));

		let positions = upload_array_to_gl(gl, &mesh.positions, glow::ARRAY_BUFFER, glow::STATIC_DRAW)?;
		gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 0, 0);
		gl.enable_vertex_attrib_array(0);

		let normals = upload_array_to_gl(gl, &mesh.normals, glow::ARRAY_BUFFER, glow::STATIC_DRAW)?;
		gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, 0, 0);
		gl.enable_vertex_attrib_array(1);

		let indices = upload_array_to_gl(gl, &mesh.indices, glow::ELEMENT_ARRAY_BUFFER, glow::STATIC_DRAW)?;

		gl.bind_vertex_array(None);

		Ok(GlMesh {
			vao,
			buffers: [positions, normals, indices],
			index_count: mesh.indices.len() as i32,
		})
	}
}
