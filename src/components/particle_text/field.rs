//! Particle storage.
//!
//! Structure-of-arrays store for one text instance. Targets, scattered
//! positions and phases are fixed at construction; positions, velocities and
//! colors change every frame but can only be written through [`ParticlesMut`],
//! which is handed out to the integrator alone.

use glam::Vec3;

use super::error::EngineError;

/// All per-particle state for one (text, instance seed) pair.
#[derive(Clone, Debug)]
pub struct ParticleField {
	targets: Vec<Vec3>,
	scattered: Option<Vec<Vec3>>,
	phases: Vec<f32>,
	positions: Vec<Vec3>,
	velocities: Vec<Vec3>,
	colors: Vec<Vec3>,
}

/// Mutable view used by the integrator.
pub(crate) struct ParticlesMut<'a> {
	pub targets: &'a [Vec3],
	pub scattered: Option<&'a [Vec3]>,
	pub phases: &'a [f32],
	pub positions: &'a mut [Vec3],
	pub velocities: &'a mut [Vec3],
	pub colors: &'a mut [Vec3],
}

impl ParticleField {
	/// Builds a field at rest.
	///
	/// Positions start at `scattered + (target - scattered) * initial_progress`
	/// (or on the targets when there is no scattered cloud), velocities at zero
	/// and colors at `base_color`.
	pub fn new(
		targets: Vec<Vec3>,
		scattered: Option<Vec<Vec3>>,
		phases: Vec<f32>,
		initial_progress: f32,
		base_color: Vec3,
	) -> Result<Self, EngineError> {
		let count = targets.len();
		if phases.len() != count {
			return Err(EngineError::MismatchedLengths {
				what: "phases",
				got: phases.len(),
				expected: count,
			});
		}
		if let Some(scattered) = &scattered {
			if scattered.len() != count {
				return Err(EngineError::MismatchedLengths {
					what: "scattered",
					got: scattered.len(),
					expected: count,
				});
			}
		}

		// Fully formed fields start exactly on their targets; lerp at 1.0 can be off by an ulp.
		let positions = match &scattered {
			Some(scattered) if initial_progress < 1.0 => scattered
				.iter()
				.zip(&targets)
				.map(|(s, t)| s.lerp(*t, initial_progress))
				.collect(),
			_ => targets.clone(),
		};

		Ok(Self {
			velocities: vec![Vec3::ZERO; count],
			colors: vec![base_color; count],
			targets,
			scattered,
			phases,
			positions,
		})
	}

	/// A field with no particles.
	pub fn empty() -> Self {
		Self {
			targets: Vec::new(),
			scattered: None,
			phases: Vec::new(),
			positions: Vec::new(),
			velocities: Vec::new(),
			colors: Vec::new(),
		}
	}

	/// Number of particles.
	pub fn len(&self) -> usize {
		self.targets.len()
	}

	/// `true` when the text produced no particles.
	pub fn is_empty(&self) -> bool {
		self.targets.is_empty()
	}

	/// Formed (text-shaped) positions.
	pub fn targets(&self) -> &[Vec3] {
		&self.targets
	}

	/// Dispersed starting positions, if this field has them.
	pub fn scattered(&self) -> Option<&[Vec3]> {
		self.scattered.as_deref()
	}

	/// Per-particle swirl phase in radians.
	pub fn phases(&self) -> &[f32] {
		&self.phases
	}

	/// Current positions.
	pub fn positions(&self) -> &[Vec3] {
		&self.positions
	}

	/// Current velocities, in world units per frame.
	pub fn velocities(&self) -> &[Vec3] {
		&self.velocities
	}

	/// Current vertex colors.
	pub fn colors(&self) -> &[Vec3] {
		&self.colors
	}

	/// Mean distance between each particle and its target.
	pub fn mean_displacement(&self) -> f32 {
		if self.is_empty() {
			return 0.0;
		}
		let total: f32 = self
			.positions
			.iter()
			.zip(&self.targets)
			.map(|(p, t)| p.distance(*t))
			.sum();
		total / self.len() as f32
	}

	/// Puts every particle on its target at rest. Colors are left as they are.
	pub fn settle(&mut self) {
		self.positions.copy_from_slice(&self.targets);
		self.velocities.fill(Vec3::ZERO);
	}

	pub(crate) fn particles_mut(&mut self) -> ParticlesMut<'_> {
		ParticlesMut {
			targets: &self.targets,
			scattered: self.scattered.as_deref(),
			phases: &self.phases,
			positions: &mut self.positions,
			velocities: &mut self.velocities,
			colors: &mut self.colors,
		}
	}
}
