//! Error types for particle field setup and the render surface.
//!
//! None of these escape the component: setup failures are logged and the
//! component falls back to the static text presentation.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while building a particle field or acquiring drawing resources.
#[derive(Debug, Error)]
pub enum EngineError {
	/// No `window` object (not running in a browser).
	#[error("no global window available")]
	NoWindow,
	/// The window has no document.
	#[error("window has no document")]
	NoDocument,
	/// A canvas refused to hand out the requested context kind.
	#[error("canvas context `{0}` is unavailable")]
	ContextUnavailable(&'static str),
	/// GLSL compilation failed.
	#[error("shader failed to compile: {0}")]
	ShaderCompile(String),
	/// Program linking failed.
	#[error("shader program failed to link: {0}")]
	ProgramLink(String),
	/// A GL object (buffer, vertex array, program) could not be created.
	#[error("failed to allocate {0}")]
	ResourceAllocation(&'static str),
	/// Parallel particle arrays disagree on their length.
	#[error("particle arrays have mismatched lengths: {what} has {got}, expected {expected}")]
	MismatchedLengths {
		/// Which array was wrong.
		what: &'static str,
		/// Its length.
		got: usize,
		/// The target array length.
		expected: usize,
	},
	/// Any other exception thrown by a browser API.
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<JsValue> for EngineError {
	fn from(value: JsValue) -> Self {
		EngineError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
