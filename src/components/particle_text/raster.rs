//! Text rasterization and particle seed extraction.
//!
//! Text is drawn white onto a transparent off-screen buffer sized to the
//! measured text plus padding. Opaque pixels on a fixed stride grid become
//! particle targets, centered on the buffer and scaled into world units.

use glam::Vec3;
use image::RgbaImage;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::config::RasterConfig;
use super::error::EngineError;
use super::scatter::SeededRandom;

/// Renders a string into an RGBA pixel buffer.
pub trait GlyphRasterizer {
	/// Draw `text` centered in a buffer of `measured width + 2 * padding` by
	/// `font_size + 2 * padding` pixels.
	fn rasterize(&self, text: &str, config: &RasterConfig) -> Result<RgbaImage, EngineError>;
}

/// Browser rasterizer backed by a detached `<canvas>` 2D context.
///
/// The canvas is created per call and dropped with the returned buffer's copy,
/// so nothing outlives seed extraction.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasGlyphs;

impl GlyphRasterizer for CanvasGlyphs {
	fn rasterize(&self, text: &str, config: &RasterConfig) -> Result<RgbaImage, EngineError> {
		let document = web_sys::window()
			.ok_or(EngineError::NoWindow)?
			.document()
			.ok_or(EngineError::NoDocument)?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| EngineError::ContextUnavailable("canvas"))?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(EngineError::ContextUnavailable("2d"))?
			.dyn_into()
			.map_err(|_| EngineError::ContextUnavailable("2d"))?;

		let font = config.font();
		ctx.set_font(&font);
		let measured = ctx.measure_text(text)?.width();

		let width = (measured + config.padding * 2.0).floor().max(1.0) as u32;
		let height = (config.font_size + config.padding * 2.0).floor().max(1.0) as u32;
		canvas.set_width(width);
		canvas.set_height(height);

		// Resizing resets the context state.
		ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
		ctx.set_font(&font);
		ctx.set_fill_style_str("#ffffff");
		ctx.set_text_baseline("middle");
		ctx.set_text_align("center");
		ctx.fill_text(text, width as f64 / 2.0, height as f64 / 2.0)?;

		let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
		let (w, h) = (data.width(), data.height());
		RgbaImage::from_raw(w, h, data.data().0).ok_or_else(|| {
			EngineError::Js(format!("image data does not match {w}x{h} RGBA"))
		})
	}
}

/// Extracts particle targets from the opaque pixels of `pixels`.
///
/// `jitter` supplies the z offsets; it is consumed once per emitted particle.
pub fn sample_seeds(pixels: &RgbaImage, config: &RasterConfig, jitter: &mut SeededRandom) -> Vec<Vec3> {
	let (width, height) = pixels.dimensions();
	let stride = config.stride.max(1) as usize;
	let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
	let scale = config.world_scale;

	let mut seeds = Vec::new();
	for y in (0..height).step_by(stride) {
		for x in (0..width).step_by(stride) {
			if pixels.get_pixel(x, y).0[3] <= config.alpha_threshold {
				continue;
			}
			let px = (x as f32 - cx) * scale;
			let py = -(y as f32 - cy) * scale;
			let pz = (jitter.next_f32() - 0.5) * config.depth_jitter;
			seeds.push(Vec3::new(px, py, pz));
		}
	}
	seeds
}

/// Rasterizes `text` and returns its particle targets.
pub fn rasterize_text(
	glyphs: &impl GlyphRasterizer,
	text: &str,
	config: &RasterConfig,
	jitter: &mut SeededRandom,
) -> Result<Vec<Vec3>, EngineError> {
	if text.trim().is_empty() {
		debug!("particle-text: empty text, no particles");
		return Ok(Vec::new());
	}

	let pixels = glyphs.rasterize(text, config)?;
	let seeds = sample_seeds(&pixels, config, jitter);

	if seeds.len() > config.warn_particle_count {
		warn!(
			"particle-text: {:?} rasterized to {} particles (soft limit {})",
			text,
			seeds.len(),
			config.warn_particle_count
		);
	}
	debug!(
		"particle-text: rasterized {:?} at {}x{} into {} particles",
		text,
		pixels.width(),
		pixels.height(),
		seeds.len()
	);
	Ok(seeds)
}
