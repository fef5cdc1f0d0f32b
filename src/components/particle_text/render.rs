//! WebGL2 point cloud renderer.
//!
//! One program, one vertex array with a position and a color buffer, one
//! `POINTS` draw per frame. Buffers are re-uploaded every frame from the field's
//! structure-of-arrays storage. Point sprites are perspective-attenuated like a
//! size-attenuated points material: `gl_PointSize = size * (height / 2) / depth`.

use glam::{Mat4, Vec2, Vec3};
use js_sys::Float32Array;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{
	HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
	WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::error::EngineError;
use super::lifecycle::RenderSurface;
use super::raycast::{Camera, field_rotation};
use super::state::ParticleTextState;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;

uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_point_scale;

out vec3 v_color;

void main() {
	vec4 view_position = u_model_view * vec4(a_position, 1.0);
	gl_Position = u_projection * view_position;
	gl_PointSize = u_point_scale / -view_position.z;
	v_color = a_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec3 v_color;
uniform float u_opacity;

out vec4 out_color;

void main() {
	out_color = vec4(v_color, u_opacity);
}
"#;

const POSITION_LOCATION: u32 = 0;
const COLOR_LOCATION: u32 = 1;

struct Uniforms {
	model_view: Option<WebGlUniformLocation>,
	projection: Option<WebGlUniformLocation>,
	point_scale: Option<WebGlUniformLocation>,
	opacity: Option<WebGlUniformLocation>,
}

/// GPU resources owned by one surface. Taken out as a whole on release.
struct Resources {
	program: WebGlProgram,
	shaders: [WebGlShader; 2],
	vao: WebGlVertexArrayObject,
	positions: WebGlBuffer,
	colors: WebGlBuffer,
	uniforms: Uniforms,
}

/// Render surface drawing into a `<canvas>` through WebGL2.
pub struct WebGlSurface {
	gl: Gl,
	canvas: HtmlCanvasElement,
	resources: Option<Resources>,
}

impl WebGlSurface {
	/// Acquires a WebGL2 context on `canvas` and builds the point program.
	pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, EngineError> {
		let gl: Gl = canvas
			.get_context("webgl2")?
			.ok_or(EngineError::ContextUnavailable("webgl2"))?
			.dyn_into()
			.map_err(|_| EngineError::ContextUnavailable("webgl2"))?;

		let mut rollback = Rollback::default();
		let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
		rollback.push(deleting(&gl, &vertex, Gl::delete_shader));
		let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
		rollback.push(deleting(&gl, &fragment, Gl::delete_shader));
		let program = link_program(&gl, &vertex, &fragment)?;
		rollback.push(deleting(&gl, &program, Gl::delete_program));

		let vao = gl
			.create_vertex_array()
			.ok_or(EngineError::ResourceAllocation("vertex array"))?;
		rollback.push(deleting(&gl, &vao, Gl::delete_vertex_array));
		let positions = gl
			.create_buffer()
			.ok_or(EngineError::ResourceAllocation("position buffer"))?;
		rollback.push(deleting(&gl, &positions, Gl::delete_buffer));
		let colors = gl
			.create_buffer()
			.ok_or(EngineError::ResourceAllocation("color buffer"))?;
		rollback.commit();

		let resources = Resources {
			uniforms: Uniforms {
				model_view: gl.get_uniform_location(&program, "u_model_view"),
				projection: gl.get_uniform_location(&program, "u_projection"),
				point_scale: gl.get_uniform_location(&program, "u_point_scale"),
				opacity: gl.get_uniform_location(&program, "u_opacity"),
			},
			program,
			shaders: [vertex, fragment],
			vao,
			positions,
			colors,
		};
		bind_attributes(&gl, &resources);

		gl.enable(Gl::BLEND);
		gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
		gl.disable(Gl::DEPTH_TEST);

		debug!("particle-text: webgl2 surface ready");
		Ok(Self {
			gl,
			canvas: canvas.clone(),
			resources: Some(resources),
		})
	}
}

/// Undo steps for a partially built surface, run newest first on drop unless
/// committed.
#[derive(Default)]
struct Rollback {
	steps: Vec<Box<dyn FnOnce()>>,
}

impl Rollback {
	fn push(&mut self, step: impl FnOnce() + 'static) {
		self.steps.push(Box::new(step));
	}

	fn commit(mut self) {
		self.steps.clear();
	}
}

impl Drop for Rollback {
	fn drop(&mut self) {
		while let Some(step) = self.steps.pop() {
			step();
		}
	}
}

fn deleting<T: Clone + 'static>(gl: &Gl, object: &T, delete: fn(&Gl, Option<&T>)) -> impl FnOnce() + 'static {
	let (gl, object) = (gl.clone(), object.clone());
	move || delete(&gl, Some(&object))
}

fn bind_attributes(gl: &Gl, resources: &Resources) {
	gl.bind_vertex_array(Some(&resources.vao));
	for (buffer, location) in [
		(&resources.positions, POSITION_LOCATION),
		(&resources.colors, COLOR_LOCATION),
	] {
		gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
		gl.enable_vertex_attrib_array(location);
		gl.vertex_attrib_pointer_with_i32(location, 3, Gl::FLOAT, false, 0, 0);
	}
	gl.bind_vertex_array(None);
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, EngineError> {
	let shader = gl
		.create_shader(kind)
		.ok_or(EngineError::ResourceAllocation("shader"))?;
	gl.shader_source(&shader, source);
	gl.compile_shader(&shader);
	let compiled = gl
		.get_shader_parameter(&shader, Gl::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false);
	if compiled {
		Ok(shader)
	} else {
		let log = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		Err(EngineError::ShaderCompile(log))
	}
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, EngineError> {
	let program = gl
		.create_program()
		.ok_or(EngineError::ResourceAllocation("program"))?;
	gl.attach_shader(&program, vertex);
	gl.attach_shader(&program, fragment);
	gl.link_program(&program);
	let linked = gl
		.get_program_parameter(&program, Gl::LINK_STATUS)
		.as_bool()
		.unwrap_or(false);
	if linked {
		Ok(program)
	} else {
		let log = gl.get_program_info_log(&program).unwrap_or_default();
		gl.delete_program(Some(&program));
		Err(EngineError::ProgramLink(log))
	}
}

fn upload(gl: &Gl, buffer: &WebGlBuffer, data: &[Vec3]) {
	let floats: &[f32] = bytemuck::cast_slice(data);
	gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
	gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &Float32Array::from(floats), Gl::DYNAMIC_DRAW);
}

/// View matrix with the field's drag rotation applied as the model transform.
pub fn model_view(camera: &Camera, rotation: Vec2) -> Mat4 {
	camera.view() * Mat4::from_quat(field_rotation(rotation))
}

/// Numerator of the attenuated point size for a drawing buffer `height` pixels tall.
pub fn point_scale(size: f32, height: f64) -> f32 {
	size * height as f32 * 0.5
}

impl RenderSurface for WebGlSurface {
	fn resize(&mut self, width: f64, height: f64) {
		self.canvas.set_width(width.max(0.0) as u32);
		self.canvas.set_height(height.max(0.0) as u32);
		self.gl.viewport(0, 0, width as i32, height as i32);
	}

	fn draw(&mut self, state: &ParticleTextState) {
		let Some(res) = self.resources.as_ref() else {
			return;
		};
		let gl = &self.gl;
		let clear = state.theme.clear;
		gl.clear_color(
			clear.r as f32 / 255.0,
			clear.g as f32 / 255.0,
			clear.b as f32 / 255.0,
			clear.a as f32,
		);
		gl.clear(Gl::COLOR_BUFFER_BIT);
		if state.field.is_empty() {
			return;
		}

		upload(gl, &res.positions, state.field.positions());
		upload(gl, &res.colors, state.field.colors());

		let style = &state.theme.particles;
		gl.use_program(Some(&res.program));
		gl.uniform_matrix4fv_with_f32_array(
			res.uniforms.model_view.as_ref(),
			false,
			&model_view(&state.camera, state.interaction.rotation).to_cols_array(),
		);
		gl.uniform_matrix4fv_with_f32_array(
			res.uniforms.projection.as_ref(),
			false,
			&state.camera.projection().to_cols_array(),
		);
		gl.uniform1f(
			res.uniforms.point_scale.as_ref(),
			point_scale(style.size, self.canvas.height() as f64),
		);
		gl.uniform1f(res.uniforms.opacity.as_ref(), style.opacity);

		gl.bind_vertex_array(Some(&res.vao));
		gl.draw_arrays(Gl::POINTS, 0, state.field.len() as i32);
		gl.bind_vertex_array(None);
	}

	fn release(&mut self) {
		let Some(res) = self.resources.take() else {
			return;
		};
		let gl = &self.gl;
		gl.delete_buffer(Some(&res.positions));
		gl.delete_buffer(Some(&res.colors));
		gl.delete_vertex_array(Some(&res.vao));
		for shader in &res.shaders {
			gl.detach_shader(&res.program, shader);
			gl.delete_shader(Some(shader));
		}
		gl.delete_program(Some(&res.program));
		debug!("particle-text: webgl2 surface released");
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use pretty_assertions::assert_eq;

	use super::*;

	fn build_until(log: &Rc<RefCell<Vec<&'static str>>>, fail_at: Option<usize>) -> Result<(), EngineError> {
		let mut rollback = Rollback::default();
		for (i, name) in ["shader", "program", "vertex array", "buffer"].into_iter().enumerate() {
			if fail_at == Some(i) {
				return Err(EngineError::ResourceAllocation(name));
			}
			let log = log.clone();
			rollback.push(move || log.borrow_mut().push(name));
		}
		rollback.commit();
		Ok(())
	}

	#[test]
	fn failed_setup_releases_everything_already_created() {
		let log = Rc::new(RefCell::new(Vec::new()));
		assert!(build_until(&log, Some(3)).is_err());
		assert_eq!(*log.borrow(), vec!["vertex array", "program", "shader"]);
	}

	#[test]
	fn completed_setup_keeps_its_objects() {
		let log = Rc::new(RefCell::new(Vec::new()));
		assert!(build_until(&log, None).is_ok());
		assert!(log.borrow().is_empty());
	}
	use crate::components::particle_text::config::CameraConfig;

	#[test]
	fn unrotated_model_view_is_the_camera_view() {
		let camera = Camera::new(&CameraConfig::default(), 800.0, 600.0);
		assert_eq!(model_view(&camera, Vec2::ZERO), camera.view());
	}

	#[test]
	fn model_view_places_origin_at_camera_distance() {
		let camera = Camera::new(&CameraConfig::default(), 800.0, 600.0);
		let origin = model_view(&camera, Vec2::new(0.3, -0.2)).transform_point3(Vec3::ZERO);
		assert!((origin.z + 2.5).abs() < 1e-5);
	}

	#[test]
	fn point_scale_follows_buffer_height() {
		assert_eq!(point_scale(0.01, 1000.0), 5.0);
		assert_eq!(point_scale(0.01, 0.0), 0.0);
	}
}
