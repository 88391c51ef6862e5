use glam::{Mat4, Vec3};
use glow::HasContext;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
#[error("Could not compile shader: {0}")]
pub struct ShaderCompileError(String);

/// Compiles a shader program composed of a vertex and fragment shader.
pub(crate) fn compile(gl: &glow::Context, vertex: &str, fragment: &str) -> Result<glow::Program, ShaderCompileError> {
	unsafe {
		let program = gl.create_program().map_err(ShaderCompileError)?;

		// Use GLSL ES 3.00 on WASM for WebGL
		#[cfg(target_arch = "wasm32")]
		let (vertex, fragment) = (
			&format!(
				"#version 300 es\nprecision highp float;\n{}",
				vertex.replace("#version 330", "")
			),
			&format!(
				"#version 300 es\nprecision highp float;\n{}",
				fragment.replace("#version 330", "")
			),
		);

		for (kind, source) in [(glow::VERTEX_SHADER, vertex), (glow::FRAGMENT_SHADER, fragment)] {
			let shader = gl.create_shader(kind).map_err(ShaderCompileError)?;
			gl.shader_source(shader, source);
			gl.compile_shader(shader);
			verify_shader(gl, shader)?;
			gl.attach_shader(program, shader);
			// the program keeps it alive
			gl.delete_shader(shader);
		}

		gl.link_program(program);
		verify_program(gl, program)?;

		Ok(program)
	}
}

unsafe fn verify_shader(gl: &glow::Context, shader: glow::Shader) -> Result<(), ShaderCompileError> {
	if gl.get_shader_compile_status(shader) {
		Ok(())
	} else {
		Err(ShaderCompileError(gl.get_shader_info_log(shader)))
	}
}

unsafe fn verify_program(gl: &glow::Context, program: glow::Program) -> Result<(), ShaderCompileError> {
	if gl.get_program_link_status(program) {
		Ok(())
	} else {
		Err(ShaderCompileError(gl.get_program_info_log(program)))
	}
}

const PART_VERT: &str = include_str!("shaders/part.vert");
const PART_FRAG: &str = include_str!("shaders/part.frag");

/// Lit, untextured surface shader used for every part.
pub struct PartShader {
	pub(crate) program: glow::Program,
	u_mvp: Option<glow::UniformLocation>,
	u_model: Option<glow::UniformLocation>,
	u_color: Option<glow::UniformLocation>,
	u_emissive: Option<glow::UniformLocation>,
	u_metalness: Option<glow::UniformLocation>,
	u_roughness: Option<glow::UniformLocation>,
	u_ambient_intensity: Option<glow::UniformLocation>,
	u_light_direction: Option<glow::UniformLocation>,
	u_light_intensity: Option<glow::UniformLocation>,
}

impl PartShader {
	pub fn new(gl: &glow::Context) -> Result<Self, ShaderCompileError> {
		debug!("Compiling Part shader");
		let program = compile(gl, PART_VERT, PART_FRAG)?;

		Ok(Self {
			program,
			u_mvp: unsafe { gl.get_uniform_location(program, "mvp") },
			u_model: unsafe { gl.get_uniform_location(program, "model") },
			u_color: unsafe { gl.get_uniform_location(program, "color") },
			u_emissive: unsafe { gl.get_uniform_location(program, "emissive") },
			u_metalness: unsafe { gl.get_uniform_location(program, "metalness") },
			u_roughness: unsafe { gl.get_uniform_location(program, "roughness") },
			u_ambient_intensity: unsafe { gl.get_uniform_location(program, "ambientIntensity") },
			u_light_direction: unsafe { gl.get_uniform_location(program, "lightDirection") },
			u_light_intensity: unsafe { gl.get_uniform_location(program, "lightIntensity") },
		})
	}

	/// Sets the `mvp` and `model` uniforms of the shader.
	#[inline]
	pub fn set_transforms(&self, gl: &glow::Context, mvp: Mat4, model: Mat4) {
		unsafe {
			gl.uniform_matrix_4_f32_slice(self.u_mvp.as_ref(), false, mvp.as_ref());
			gl.uniform_matrix_4_f32_slice(self.u_model.as_ref(), false, model.as_ref());
		}
	}

	#[inline]
	pub fn set_surface(&self, gl: &glow::Context, color: Vec3, emissive: Vec3, metalness: f32, roughness: f32) {
		unsafe {
			gl.uniform_3_f32_slice(self.u_color.as_ref(), color.as_ref());
			gl.uniform_3_f32_slice(self.u_emissive.as_ref(), emissive.as_ref());
			gl.uniform_1_f32(self.u_metalness.as_ref(), metalness);
			gl.uniform_1_f32(self.u_roughness.as_ref(), roughness);
		}
	}

	/// `direction` points from the scene towards the light.
	pub fn set_lights(&self, gl: &glow::Context, ambient: f32, direction: Vec3, intensity: f32) {
		unsafe {
			gl.uniform_1_f32(self.u_ambient_intensity.as_ref(), ambient);
			gl.uniform_3_f32_slice(self.u_light_direction.as_ref(), direction.normalize().as_ref());
			gl.uniform_1_f32(self.u_light_intensity.as_ref(), intensity);
		}
	}
}
