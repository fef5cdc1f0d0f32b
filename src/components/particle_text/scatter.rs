//! Seeded scatter cloud and phase generation.
//!
//! The generator is a fixed linear congruential recurrence so that a given
//! instance identifier always produces the same cloud, on every run and every
//! platform.

use std::f32::consts::TAU;

use glam::Vec3;

use super::config::ScatterConfig;

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;

/// Salt mixed into the instance seed for the rasterizer's depth jitter, so the
/// jitter stream never shifts the scatter stream.
pub const JITTER_SALT: u32 = 0x9e37;

/// Deterministic pseudo-random source: `state = (state * 9301 + 49297) mod 233280`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandom {
	state: u64,
}

impl SeededRandom {
	/// Generator whose first output is derived from `seed`.
	pub fn new(seed: u32) -> Self {
		Self { state: seed as u64 }
	}

	/// Seed from a stable instance identifier (sum of its code points).
	pub fn from_instance_id(id: &str) -> Self {
		Self::new(instance_seed(id))
	}

	/// Next value in `[0, 1)`.
	pub fn next_f32(&mut self) -> f32 {
		self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
		(self.state as f64 / MODULUS as f64) as f32
	}
}

/// Numeric seed for an instance identifier.
pub fn instance_seed(id: &str) -> u32 {
	id.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32))
}

/// Draws `count` scattered positions, x then y then z per particle.
pub fn scatter_positions(rng: &mut SeededRandom, count: usize, config: &ScatterConfig) -> Vec<Vec3> {
	let [hx, hy, hz] = config.half_extent;
	(0..count)
		.map(|_| {
			let x = (rng.next_f32() - 0.5) * 2.0 * hx;
			let y = (rng.next_f32() - 0.5) * 2.0 * hy;
			let z = (rng.next_f32() - 0.5) * 2.0 * hz;
			Vec3::new(x, y, z)
		})
		.collect()
}

/// Draws `count` swirl phases in `[0, 2π)`.
pub fn phases(rng: &mut SeededRandom, count: usize) -> Vec<f32> {
	(0..count).map(|_| rng.next_f32() * TAU).collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn recurrence_matches_reference_values() {
		let mut rng = SeededRandom::new(1);
		// (1 * 9301 + 49297) % 233280 = 58598
		assert_eq!(rng.next_f32(), (58598.0f64 / 233280.0) as f32);
		// (58598 * 9301 + 49297) % 233280
		let second = (58598u64 * 9301 + 49297) % 233280;
		assert_eq!(rng.next_f32(), (second as f64 / 233280.0) as f32);
	}

	#[test]
	fn values_stay_in_unit_interval() {
		let mut rng = SeededRandom::new(u32::MAX);
		for _ in 0..10_000 {
			let v = rng.next_f32();
			assert!((0.0..1.0).contains(&v), "{v} out of range");
		}
	}

	#[test]
	fn same_instance_reproduces_cloud_and_phases() {
		let config = ScatterConfig::default();
		let build = || {
			let mut rng = SeededRandom::from_instance_id("solo-polvo");
			let cloud = scatter_positions(&mut rng, 500, &config);
			let phases = phases(&mut rng, 500);
			(cloud, phases)
		};
		let (a_cloud, a_phases) = build();
		let (b_cloud, b_phases) = build();
		assert_eq!(
			bytemuck::cast_slice::<Vec3, u8>(&a_cloud),
			bytemuck::cast_slice::<Vec3, u8>(&b_cloud)
		);
		assert_eq!(
			bytemuck::cast_slice::<f32, u8>(&a_phases),
			bytemuck::cast_slice::<f32, u8>(&b_phases)
		);
	}

	#[test]
	fn different_instances_scatter_differently() {
		let config = ScatterConfig::default();
		let a = scatter_positions(&mut SeededRandom::from_instance_id("hero"), 64, &config);
		let b = scatter_positions(&mut SeededRandom::from_instance_id("footer"), 64, &config);
		assert_ne!(a, b);
	}

	#[test]
	fn cloud_respects_bounds() {
		let config = ScatterConfig::default();
		let cloud = scatter_positions(&mut SeededRandom::new(7), 2_000, &config);
		for p in cloud {
			assert!(p.x >= -3.0 && p.x < 3.0);
			assert!(p.y >= -2.0 && p.y < 2.0);
			assert!(p.z >= -1.0 && p.z < 1.0);
		}
	}

	#[test]
	fn phases_cover_full_turn_range() {
		let phases = phases(&mut SeededRandom::new(3), 1_000);
		assert!(phases.iter().all(|p| (0.0..TAU).contains(p)));
	}
}
