//! Tuning parameters for the particle text engine.
//!
//! Every constant the rasterizer, scatter generator, integrator and pointer
//! adapter use lives here, grouped by concern. All groups deserialize with
//! per-field defaults so a page can override a single value from JSON.
//!
//! # Units
//!
//! - **Pixels**: font size, padding and stride refer to the off-screen
//!   rasterization buffer.
//! - **World units**: everything else. One pixel of the rasterized text maps to
//!   [`RasterConfig::world_scale`] world units; the camera sits
//!   [`CameraConfig::distance`] units in front of the text plane.

use serde::{Deserialize, Deserializer};

use super::forces::EffectMode;

/// How particles reach the text shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formation {
	/// Particles start scattered and converge as progress goes from 0 to 1.
	#[default]
	Progressive,
	/// Particles sit on the text from the start and only swirl around it.
	Static,
}

impl Formation {
	/// Effect mode selected when a handle is created for this variant.
	pub fn default_effect(self) -> EffectMode {
		match self {
			Formation::Progressive => EffectMode::Wave,
			Formation::Static => EffectMode::Default,
		}
	}
}

/// Off-screen text rendering and seed extraction.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
	/// Font size in pixels.
	pub font_size: f64,
	/// CSS font weight.
	pub font_weight: String,
	/// CSS font family list.
	pub font_family: String,
	/// Empty border around the measured text, in pixels.
	pub padding: f64,
	/// Sample every `stride`-th pixel in both directions.
	pub stride: u32,
	/// Pixels with alpha strictly above this become particles.
	pub alpha_threshold: u8,
	/// World units per pixel.
	pub world_scale: f32,
	/// Total depth range of the z jitter, centered on the text plane.
	pub depth_jitter: f32,
	/// Particle counts above this are logged as suspicious. Nothing is capped.
	pub warn_particle_count: usize,
}

impl RasterConfig {
	/// CSS font shorthand, e.g. `bold 180px sans-serif`.
	pub fn font(&self) -> String {
		format!("{} {}px {}", self.font_weight, self.font_size, self.font_family)
	}
}

impl Default for RasterConfig {
	fn default() -> Self {
		Self {
			font_size: 180.0,
			font_weight: "bold".into(),
			font_family: "\"Space Grotesk\", \"Geist\", sans-serif".into(),
			padding: 80.0,
			stride: 2,
			alpha_threshold: 128,
			world_scale: 0.0025,
			depth_jitter: 0.1,
			warn_particle_count: 60_000,
		}
	}
}

/// Bounds of the seeded scatter cloud.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
	/// Half extent per axis; positions land in `[-h, h]`.
	pub half_extent: [f32; 3],
}

impl Default for ScatterConfig {
	fn default() -> Self {
		Self {
			half_extent: [3.0, 2.0, 1.0],
		}
	}
}

/// Spring constants for one formation regime.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Dynamics {
	/// Fraction of the remaining distance to the target added to velocity per frame.
	pub attraction: f32,
	/// Velocity multiplier applied every frame.
	pub damping: f32,
}

impl Dynamics {
	/// Spring while particles travel from the scattered cloud.
	pub const FORMING: Dynamics = Dynamics {
		attraction: 0.15,
		damping: 0.9,
	};
	/// Softer spring once the text has formed.
	pub const FORMED: Dynamics = Dynamics {
		attraction: 0.05,
		damping: 0.95,
	};
}

impl Default for Dynamics {
	fn default() -> Self {
		Self::FORMING
	}
}

/// Partially specified spring, completed from a regime's defaults.
#[derive(Deserialize)]
struct DynamicsOverride {
	attraction: Option<f32>,
	damping: Option<f32>,
}

impl DynamicsOverride {
	fn over(self, base: Dynamics) -> Dynamics {
		Dynamics {
			attraction: self.attraction.unwrap_or(base.attraction),
			damping: self.damping.unwrap_or(base.damping),
		}
	}
}

fn forming_dynamics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Dynamics, D::Error> {
	Ok(DynamicsOverride::deserialize(deserializer)?.over(Dynamics::FORMING))
}

fn formed_dynamics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Dynamics, D::Error> {
	Ok(DynamicsOverride::deserialize(deserializer)?.over(Dynamics::FORMED))
}

/// Formation, swirl and spring parameters for the integrator.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
	/// Swirl circle radius around each target.
	pub swirl_radius: f32,
	/// Swirl angular speed in radians per second.
	pub angular_speed: f32,
	/// Eased progress where swirl starts ramping in.
	pub swirl_threshold: f32,
	/// Eased progress above which pointer effects apply (progressive variant).
	pub interaction_threshold: f32,
	/// Eased progress at which the formed regime takes over.
	pub formed_threshold: f32,
	/// Spring used while particles are still travelling.
	#[serde(deserialize_with = "forming_dynamics")]
	pub forming: Dynamics,
	/// Spring used once the text is (nearly) formed.
	#[serde(deserialize_with = "formed_dynamics")]
	pub formed: Dynamics,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			swirl_radius: 0.005,
			angular_speed: 0.5,
			swirl_threshold: 0.7,
			interaction_threshold: 0.8,
			formed_threshold: 0.9,
			forming: Dynamics::FORMING,
			formed: Dynamics::FORMED,
		}
	}
}

/// Wave effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
	/// Peak force.
	pub strength: f32,
	/// Spatial frequency (radians per world unit).
	pub frequency: f32,
	/// Temporal frequency (radians per second).
	pub speed: f32,
	/// Fraction of the force pushed along +z.
	pub lift: f32,
}

impl Default for WaveConfig {
	fn default() -> Self {
		Self {
			strength: 0.2,
			frequency: 15.0,
			speed: 8.0,
			lift: 0.5,
		}
	}
}

/// Vortex effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VortexConfig {
	/// Tangential force at the center.
	pub swirl: f32,
	/// Radial pull towards the pointer at the center.
	pub pull: f32,
	/// No force inside this distance.
	pub min_distance: f32,
}

impl Default for VortexConfig {
	fn default() -> Self {
		Self {
			swirl: 0.04,
			pull: 0.01,
			min_distance: 0.02,
		}
	}
}

/// Pointer force fields.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
	/// Influence radius shared by all effects and the color falloff.
	pub radius: f32,
	/// Repulsion strength in [`EffectMode::Default`].
	pub repulsion: f32,
	/// Repulsion strength in [`EffectMode::Spark`].
	pub spark: f32,
	/// [`EffectMode::Wave`] parameters.
	pub wave: WaveConfig,
	/// [`EffectMode::Vortex`] parameters.
	pub vortex: VortexConfig,
}

impl Default for EffectConfig {
	fn default() -> Self {
		Self {
			radius: 0.3,
			repulsion: 0.01,
			spark: 0.08,
			wave: WaveConfig::default(),
			vortex: VortexConfig::default(),
		}
	}
}

/// Drag-to-rotate behavior.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Radians of rotation per pixel of drag.
	pub drag_sensitivity: f32,
	/// Fraction of the remaining rotation applied per frame.
	pub rotation_smoothing: f32,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			drag_sensitivity: 0.005,
			rotation_smoothing: 0.1,
		}
	}
}

/// Perspective camera placement.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
	/// Vertical field of view in degrees.
	pub fov_degrees: f32,
	/// Near clip plane.
	pub near: f32,
	/// Far clip plane.
	pub far: f32,
	/// Distance from the camera to the text plane along +z.
	pub distance: f32,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			fov_degrees: 50.0,
			near: 0.1,
			far: 1000.0,
			distance: 2.5,
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Progressive (scroll-driven) or static formation.
	pub formation: Formation,
	/// Text rasterization.
	pub raster: RasterConfig,
	/// Scattered start cloud.
	pub scatter: ScatterConfig,
	/// Formation, swirl and spring parameters.
	pub physics: PhysicsConfig,
	/// Pointer effect parameters.
	pub effects: EffectConfig,
	/// Drag rotation.
	pub interaction: InteractionConfig,
	/// Perspective camera.
	pub camera: CameraConfig,
	/// Theme preset name, see [`super::theme::Theme::named`].
	pub theme: Option<String>,
}
