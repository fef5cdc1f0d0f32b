//! Pointer force fields and formation curves.
//!
//! Each effect is a pure function of the particle position, the interaction
//! point (both in field-local space) and the clock, so they can be checked in
//! isolation from the integration loop.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use super::config::{EffectConfig, VortexConfig, WaveConfig};

/// Distances at or below this produce no force.
pub const MIN_FORCE_DISTANCE: f32 = 1e-3;

/// Which pointer force law is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
	/// Gentle radial repulsion.
	#[default]
	Default,
	/// Strong radial repulsion.
	Spark,
	/// Expanding ripple rings.
	Wave,
	/// Orbit around the pointer with a slight pull-in.
	Vortex,
}

impl EffectMode {
	/// All modes, in display order.
	pub const ALL: [EffectMode; 4] = [
		EffectMode::Default,
		EffectMode::Spark,
		EffectMode::Wave,
		EffectMode::Vortex,
	];

	/// Human-readable label.
	pub fn label(self) -> &'static str {
		match self {
			EffectMode::Default => "default",
			EffectMode::Spark => "spark",
			EffectMode::Wave => "wave",
			EffectMode::Vortex => "vortex",
		}
	}
}

/// Cubic ease-out, `1 - (1 - t)^3`.
pub fn ease_out_cubic(t: f32) -> f32 {
	1.0 - (1.0 - t).powi(3)
}

/// Linear ramp from 0 at `threshold` to 1 at 1.0.
pub fn ramp_above(value: f32, threshold: f32) -> f32 {
	if value <= threshold || threshold >= 1.0 {
		return 0.0;
	}
	((value - threshold) / (1.0 - threshold)).min(1.0)
}

/// Offset on the swirl circle for a particle with the given phase.
pub fn swirl_offset(radius: f32, angular_speed: f32, time: f32, phase: f32) -> Vec3 {
	let theta = angular_speed * time + phase;
	Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0)
}

/// Force exerted on a particle at `position` by an interaction at `point`.
pub fn interaction_force(
	effect: EffectMode,
	position: Vec3,
	point: Vec3,
	time: f32,
	config: &EffectConfig,
) -> Vec3 {
	match effect {
		EffectMode::Default => repulsion_force(position, point, config.radius, config.repulsion),
		EffectMode::Spark => repulsion_force(position, point, config.radius, config.spark),
		EffectMode::Wave => wave_force(position, point, time, config.radius, &config.wave),
		EffectMode::Vortex => vortex_force(position, point, config.radius, &config.vortex),
	}
}

/// Radial push away from `point`, fading linearly to zero at `radius`.
pub fn repulsion_force(position: Vec3, point: Vec3, radius: f32, strength: f32) -> Vec3 {
	let offset = position - point;
	let dist = offset.length();
	if dist >= radius || dist <= MIN_FORCE_DISTANCE {
		return Vec3::ZERO;
	}
	offset / dist * strength * (1.0 - dist / radius)
}

/// Ripple travelling outwards from `point`.
///
/// The in-plane component follows the radial direction; a fraction of the
/// magnitude lifts the particle along +z.
pub fn wave_force(position: Vec3, point: Vec3, time: f32, radius: f32, wave: &WaveConfig) -> Vec3 {
	let offset = position - point;
	let dist = offset.length();
	if dist >= radius || dist <= MIN_FORCE_DISTANCE {
		return Vec3::ZERO;
	}
	let phase = time * wave.speed - dist * wave.frequency;
	let magnitude = phase.sin() * wave.strength * (1.0 - dist / radius);
	Vec3::new(
		offset.x / dist * magnitude,
		offset.y / dist * magnitude,
		magnitude * wave.lift,
	)
}

/// Counter-clockwise orbit around `point` with a weaker pull towards it.
pub fn vortex_force(position: Vec3, point: Vec3, radius: f32, vortex: &VortexConfig) -> Vec3 {
	let radial = (position - point).truncate();
	let dist = radial.length();
	if dist >= radius || dist <= vortex.min_distance.max(MIN_FORCE_DISTANCE) {
		return Vec3::ZERO;
	}
	let falloff = 1.0 - dist / radius;
	let dir = radial / dist;
	let tangent = dir.perp();
	let force: Vec2 = tangent * vortex.swirl * falloff - dir * vortex.pull * falloff;
	force.extend(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f32 = 1e-6;

	#[test]
	fn easing_endpoints() {
		assert_eq!(ease_out_cubic(0.0), 0.0);
		assert_eq!(ease_out_cubic(1.0), 1.0);
		assert!((ease_out_cubic(0.5) - 0.875).abs() < EPS);
	}

	#[test]
	fn ramp_is_zero_below_threshold_and_one_at_end() {
		assert_eq!(ramp_above(0.5, 0.7), 0.0);
		assert_eq!(ramp_above(0.7, 0.7), 0.0);
		assert!((ramp_above(0.85, 0.7) - 0.5).abs() < 1e-5);
		assert_eq!(ramp_above(1.0, 0.7), 1.0);
	}

	#[test]
	fn swirl_stays_on_circle() {
		for i in 0..16 {
			let o = swirl_offset(0.005, 0.5, i as f32 * 0.37, 1.3);
			assert!((o.length() - 0.005).abs() < EPS);
			assert_eq!(o.z, 0.0);
		}
	}

	#[test]
	fn every_effect_is_zero_outside_radius() {
		let config = EffectConfig::default();
		let far = Vec3::new(1.0, 0.0, 0.0);
		for effect in EffectMode::ALL {
			for t in [0.0, 0.3, 1.7] {
				assert_eq!(interaction_force(effect, far, Vec3::ZERO, t, &config), Vec3::ZERO);
			}
		}
	}

	#[test]
	fn every_effect_is_zero_at_the_pointer() {
		let config = EffectConfig::default();
		let p = Vec3::new(0.1, 0.1, 0.0);
		for effect in EffectMode::ALL {
			let f = interaction_force(effect, p, p, 0.25, &config);
			assert!(f.is_finite());
			assert_eq!(f, Vec3::ZERO);
		}
	}

	#[test]
	fn repulsion_points_away_and_spark_is_stronger() {
		let config = EffectConfig::default();
		let p = Vec3::new(0.1, 0.0, 0.0);
		let gentle = interaction_force(EffectMode::Default, p, Vec3::ZERO, 0.0, &config);
		let spark = interaction_force(EffectMode::Spark, p, Vec3::ZERO, 0.0, &config);
		assert!(gentle.x > 0.0 && gentle.y.abs() < EPS);
		assert!(spark.x > gentle.x * 4.0);
	}

	#[test]
	fn vortex_is_mostly_tangential_and_pulls_in() {
		let config = EffectConfig::default();
		let p = Vec3::new(0.1, 0.0, 0.0);
		let f = interaction_force(EffectMode::Vortex, p, Vec3::ZERO, 0.0, &config);
		// Radial direction is +x, tangent is +y.
		assert!(f.y > 0.0);
		assert!(f.x < 0.0);
		assert!(f.y.abs() > f.x.abs());
		assert_eq!(f.z, 0.0);
	}

	#[test]
	fn vortex_ignores_particles_inside_min_distance() {
		let config = EffectConfig::default();
		let p = Vec3::new(0.01, 0.0, 0.0);
		assert_eq!(interaction_force(EffectMode::Vortex, p, Vec3::ZERO, 0.0, &config), Vec3::ZERO);
	}

	#[test]
	fn wave_follows_sine_of_travelling_phase() {
		let wave = WaveConfig::default();
		let p = Vec3::new(0.15, 0.0, 0.0);
		let t = 0.5;
		let f = wave_force(p, Vec3::ZERO, t, 0.3, &wave);
		let expected = (t * 8.0 - 0.15 * 15.0).sin() * 0.2 * 0.5;
		assert!((f.x - expected).abs() < EPS);
		assert!(f.y.abs() < EPS);
		assert!((f.z - expected * 0.5).abs() < EPS);
	}
}
