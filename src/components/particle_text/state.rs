//! Simulation context for one mounted particle text.
//!
//! Bundles the particle field with pointer state, camera, controls and
//! configuration. Created once per (text, instance) pair, then mutated each
//! frame by the frame loop. Event handlers reach it through the same owner but
//! only write interaction state; only [`ParticleTextState::tick`] writes the
//! field.

use glam::{Vec2, Vec3};
use log::info;

use super::config::{EngineConfig, Formation};
use super::control::ParticleTextHandle;
use super::error::EngineError;
use super::field::ParticleField;
use super::interaction::InteractionState;
use super::physics::{self, FrameInput, StepParams};
use super::raster::{self, GlyphRasterizer};
use super::raycast::Camera;
use super::scatter::{self, JITTER_SALT, SeededRandom};
use super::theme::Theme;

/// Core particle text state combining the field with interaction and view tracking.
pub struct ParticleTextState {
	/// Particle store.
	pub field: ParticleField,
	/// Pointer hover and drag state.
	pub interaction: InteractionState,
	/// Camera used for picking and drawing.
	pub camera: Camera,
	/// Shared progress and effect cells.
	pub controls: ParticleTextHandle,
	/// Tuning parameters.
	pub config: EngineConfig,
	/// Resolved theme preset.
	pub theme: Theme,
	/// Surface width in CSS pixels.
	pub width: f64,
	/// Surface height in CSS pixels.
	pub height: f64,
	/// Clock of the last frame, in seconds.
	pub time: f32,
	/// Treat the text as fully formed regardless of the handle's progress.
	pinned_formed: bool,
}

impl ParticleTextState {
	/// Rasterizes `text`, scatters it with the seed of `instance_id` and puts
	/// the particles at the handle's current progress.
	pub fn new(
		glyphs: &impl GlyphRasterizer,
		text: &str,
		instance_id: &str,
		controls: ParticleTextHandle,
		config: EngineConfig,
		width: f64,
		height: f64,
	) -> Result<Self, EngineError> {
		let seed = scatter::instance_seed(instance_id);
		let mut jitter = SeededRandom::new(seed.wrapping_add(JITTER_SALT));
		let targets = raster::rasterize_text(glyphs, text, &config.raster, &mut jitter)?;
		Self::from_targets(targets, seed, controls, config, width, height)
	}

	/// Builds the state from already extracted targets.
	pub fn from_targets(
		targets: Vec<Vec3>,
		seed: u32,
		controls: ParticleTextHandle,
		config: EngineConfig,
		width: f64,
		height: f64,
	) -> Result<Self, EngineError> {
		let count = targets.len();
		let mut rng = SeededRandom::new(seed);
		let scattered = match config.formation {
			Formation::Progressive => Some(scatter::scatter_positions(&mut rng, count, &config.scatter)),
			Formation::Static => None,
		};
		let phases = scatter::phases(&mut rng, count);

		let theme = Theme::named(config.theme.as_deref());
		let field = ParticleField::new(
			targets,
			scattered,
			phases,
			controls.progress(),
			theme.particles.color.to_vec3(),
		)?;
		info!(
			"particle-text: built field of {} particles ({:?} formation, seed {})",
			count, config.formation, seed
		);

		Ok(Self {
			field,
			interaction: InteractionState::default(),
			camera: Camera::new(&config.camera, width, height),
			controls,
			config,
			theme,
			width,
			height,
			time: 0.0,
			pinned_formed: false,
		})
	}

	/// Holds the field on its targets and ignores the handle's progress from
	/// now on. The shared handle itself is left untouched.
	pub fn pin_formed(&mut self) {
		self.pinned_formed = true;
		self.field.settle();
	}

	/// `true` once [`ParticleTextState::pin_formed`] was called.
	pub fn is_pinned_formed(&self) -> bool {
		self.pinned_formed
	}

	/// Runs one frame: eases rotation, resolves the local interaction point and
	/// integrates every particle.
	pub fn tick(&mut self, timestamp_ms: f64) {
		self.time = (timestamp_ms * 0.001) as f32;
		let interaction = self.interaction.advance(&self.config.interaction);
		let controls = self.controls.snapshot();
		let progress = if self.pinned_formed { 1.0 } else { controls.progress };

		let frame = FrameInput {
			time: self.time,
			progress,
			effect: controls.effect,
			interaction,
		};
		let params = StepParams {
			formation: self.config.formation,
			physics: &self.config.physics,
			effects: &self.config.effects,
			shading: self.theme.shading(),
		};
		physics::step(&mut self.field, &frame, &params);
	}

	/// Pointer moved over the surface at CSS pixel `(x, y)`.
	pub fn pointer_move(&mut self, x: f64, y: f64, client_width: f64, client_height: f64) {
		let hit = self.camera.pick(
			Vec2::new(x as f32, y as f32),
			Vec2::new(client_width as f32, client_height as f32),
		);
		self.interaction.hover(hit);
	}

	/// Pointer left the surface.
	pub fn pointer_leave(&mut self) {
		self.interaction.leave();
	}

	/// Mouse button or finger went down at client position `(client_x, client_y)`.
	pub fn drag_start(&mut self, client_x: f64, client_y: f64) {
		self.interaction
			.drag_start(Vec2::new(client_x as f32, client_y as f32));
	}

	/// Drag continued to client position `(client_x, client_y)`.
	pub fn drag_move(&mut self, client_x: f64, client_y: f64) {
		self.interaction.drag_move(
			Vec2::new(client_x as f32, client_y as f32),
			&self.config.interaction,
		);
	}

	/// Mouse button or finger released.
	pub fn drag_end(&mut self) {
		self.interaction.drag_end();
	}

	/// New surface size. Only the projection changes; particles keep their
	/// world coordinates.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.camera.resize(width, height);
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::particle_text::config::RasterConfig;
	use crate::components::particle_text::forces::EffectMode;
	use crate::components::particle_text::raster::tests::BlockGlyphs;

	pub(crate) fn small_engine_config(formation: Formation) -> EngineConfig {
		EngineConfig {
			formation,
			raster: RasterConfig {
				font_size: 40.0,
				padding: 10.0,
				..RasterConfig::default()
			},
			..EngineConfig::default()
		}
	}

	pub(crate) fn build(text: &str, id: &str, controls: ParticleTextHandle) -> ParticleTextState {
		ParticleTextState::new(
			&BlockGlyphs,
			text,
			id,
			controls,
			small_engine_config(Formation::Progressive),
			1600.0,
			400.0,
		)
		.unwrap()
	}

	#[test]
	fn same_text_and_instance_reproduce_field() {
		let a = build("AB", "hero", ParticleTextHandle::default());
		let b = build("AB", "hero", ParticleTextHandle::default());
		assert!(a.field.len() > 0);
		assert_eq!(a.field.len(), b.field.len());
		assert_eq!(
			bytemuck::cast_slice::<Vec3, u8>(a.field.scattered().unwrap()),
			bytemuck::cast_slice::<Vec3, u8>(b.field.scattered().unwrap())
		);
		assert_eq!(
			bytemuck::cast_slice::<f32, u8>(a.field.phases()),
			bytemuck::cast_slice::<f32, u8>(b.field.phases())
		);
		assert_eq!(a.field.targets(), b.field.targets());
	}

	#[test]
	fn pinned_progress_starts_on_targets() {
		let controls = ParticleTextHandle::default();
		controls.set_progress(1.0);
		let state = build("AB", "hero", controls);
		assert_eq!(state.field.positions(), state.field.targets());
	}

	#[test]
	fn pinned_state_ignores_handle_progress() {
		let controls = ParticleTextHandle::default();
		let mut state = build("AB", "hero", controls.clone());
		assert_ne!(state.field.positions(), state.field.targets());

		state.pin_formed();
		assert_eq!(state.field.positions(), state.field.targets());
		assert_eq!(controls.progress(), 0.0);

		for i in 0..200 {
			state.tick(i as f64 * 16.0);
		}
		assert!(state.field.mean_displacement() < 0.01);
		assert_eq!(controls.progress(), 0.0);
	}

	#[test]
	fn empty_text_ticks_safely() {
		let mut state = build("", "hero", ParticleTextHandle::default());
		assert_eq!(state.field.len(), 0);
		state.pointer_move(800.0, 200.0, 1600.0, 400.0);
		state.tick(16.0);
		state.tick(32.0);
		assert!(state.field.positions().is_empty());
		assert!(state.field.velocities().is_empty());
		assert!(state.field.colors().is_empty());
	}

	#[test]
	fn static_formation_has_no_scatter_cloud() {
		let state = ParticleTextState::new(
			&BlockGlyphs,
			"AB",
			"hero",
			ParticleTextHandle::new(Formation::Static),
			small_engine_config(Formation::Static),
			800.0,
			400.0,
		)
		.unwrap();
		assert!(state.field.scattered().is_none());
		assert_eq!(state.field.positions(), state.field.targets());
	}

	#[test]
	fn effect_switch_applies_on_next_tick() {
		let controls = ParticleTextHandle::default();
		controls.set_progress(1.0);
		let mut a = build("AB", "hero", controls.clone());
		let mut b = build("AB", "hero", ParticleTextHandle::default());
		b.controls.set_progress(1.0);
		b.controls.set_effect(EffectMode::Spark);
		for state in [&mut a, &mut b] {
			state.pointer_move(800.0, 200.0, 1600.0, 400.0);
			state.tick(0.0);
		}
		assert_ne!(a.field.velocities(), b.field.velocities());
	}

	#[test]
	fn leaving_restores_base_colors() {
		let controls = ParticleTextHandle::default();
		controls.set_progress(1.0);
		let mut state = build("AB", "hero", controls);
		state.pointer_move(800.0, 200.0, 1600.0, 400.0);
		state.tick(16.0);
		assert!(state.field.colors().iter().any(|c| *c != Vec3::ONE));
		state.pointer_leave();
		state.tick(32.0);
		assert!(state.field.colors().iter().all(|c| *c == Vec3::ONE));
	}

	#[test]
	fn resize_changes_projection_only() {
		let mut state = build("AB", "hero", ParticleTextHandle::default());
		let before = state.field.targets().to_vec();
		state.resize(400.0, 400.0);
		assert_eq!(state.camera.aspect, 1.0);
		assert_eq!(state.field.targets(), before.as_slice());
	}
}
