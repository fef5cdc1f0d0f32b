//! Per-frame force accumulation and explicit Euler integration.

use glam::Vec3;

use super::config::{Dynamics, EffectConfig, Formation, PhysicsConfig};
use super::field::{ParticleField, ParticlesMut};
use super::forces::{self, EffectMode};

/// Everything the integrator reads besides the field itself, sampled once per frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
	/// Shared clock in seconds.
	pub time: f32,
	/// Raw formation progress, already clamped to `[0, 1]` by the controller.
	pub progress: f32,
	/// Pointer force law.
	pub effect: EffectMode,
	/// Interaction point in field-local space.
	pub interaction: Option<Vec3>,
}

/// Particle colors at rest and at the edge of the pointer's influence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
	/// Color at rest.
	pub base: Vec3,
	/// Color at the rim of the pointer radius.
	pub edge: Vec3,
}

impl Default for Shading {
	fn default() -> Self {
		Self {
			base: Vec3::ONE,
			edge: Vec3::splat(0.7),
		}
	}
}

/// Static parameters of the integrator.
#[derive(Clone, Copy, Debug)]
pub struct StepParams<'a> {
	/// Progressive or static formation.
	pub formation: Formation,
	/// Formation, swirl and spring parameters.
	pub physics: &'a PhysicsConfig,
	/// Pointer effect parameters.
	pub effects: &'a EffectConfig,
	/// Proximity colors.
	pub shading: Shading,
}

/// Regime-dependent values derived from progress once per frame.
struct FrameTerms {
	eased: f32,
	swirl: f32,
	dynamics: Dynamics,
	interactive: bool,
}

impl FrameTerms {
	fn new(params: &StepParams<'_>, progress: f32) -> Self {
		let physics = params.physics;
		match params.formation {
			Formation::Progressive => {
				let eased = forces::ease_out_cubic(progress);
				Self {
					eased,
					swirl: forces::ramp_above(eased, physics.swirl_threshold),
					dynamics: if eased < physics.formed_threshold {
						physics.forming
					} else {
						physics.formed
					},
					interactive: eased > physics.interaction_threshold,
				}
			}
			Formation::Static => Self {
				eased: 1.0,
				swirl: 1.0,
				dynamics: physics.formed,
				interactive: true,
			},
		}
	}
}

/// Advances every particle by one frame.
///
/// Only this function writes positions, velocities and colors.
pub fn step(field: &mut ParticleField, frame: &FrameInput, params: &StepParams<'_>) {
	if field.is_empty() {
		return;
	}

	let terms = FrameTerms::new(params, frame.progress);
	let physics = params.physics;
	let effects = params.effects;
	let pointer = frame.interaction.filter(|_| terms.interactive);

	let ParticlesMut {
		targets,
		scattered,
		phases,
		positions,
		velocities,
		colors,
	} = field.particles_mut();

	for j in 0..targets.len() {
		let target = targets[j];
		let mut goal = match scattered {
			Some(scattered) => scattered[j].lerp(target, terms.eased),
			None => target,
		};
		if terms.swirl > 0.0 {
			goal += forces::swirl_offset(
				physics.swirl_radius,
				physics.angular_speed,
				frame.time,
				phases[j],
			) * terms.swirl;
		}

		let mut position = positions[j];
		let mut velocity = velocities[j];

		if let Some(point) = pointer {
			velocity += forces::interaction_force(frame.effect, position, point, frame.time, effects);
		}

		velocity += (goal - position) * terms.dynamics.attraction;
		velocity *= terms.dynamics.damping;
		position += velocity;

		positions[j] = position;
		velocities[j] = velocity;
		colors[j] = shade(position, frame.interaction, effects.radius, &params.shading);
	}
}

/// Color for a particle: `edge` at the rim of the pointer's radius blending to
/// `base` at its center, `base` everywhere else. Distance is measured in the
/// text plane.
pub fn shade(position: Vec3, interaction: Option<Vec3>, radius: f32, shading: &Shading) -> Vec3 {
	let Some(point) = interaction else {
		return shading.base;
	};
	let dist = position.truncate().distance(point.truncate());
	if dist < radius {
		shading.edge.lerp(shading.base, 1.0 - dist / radius)
	} else {
		shading.base
	}
}
