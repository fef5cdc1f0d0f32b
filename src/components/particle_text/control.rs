//! Externally driven formation progress and effect selection.
//!
//! The handle is a pair of single-slot cells: writers (scroll handlers, UI
//! buttons) overwrite the value at any rate, the frame loop polls it once per
//! frame. There is no notification mechanism.

use std::cell::Cell;
use std::rc::Rc;

use super::config::Formation;
use super::forces::EffectMode;

/// Values the integrator reads at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSnapshot {
	/// Formation progress in `[0, 1]`.
	pub progress: f32,
	/// Active pointer effect.
	pub effect: EffectMode,
}

/// Imperative control surface for a mounted particle text.
///
/// Clones share the same cells.
#[derive(Clone, Debug)]
pub struct ParticleTextHandle {
	progress: Rc<Cell<f32>>,
	effect: Rc<Cell<EffectMode>>,
}

impl ParticleTextHandle {
	/// A handle starting scattered, with the formation's default effect.
	pub fn new(formation: Formation) -> Self {
		Self {
			progress: Rc::new(Cell::new(0.0)),
			effect: Rc::new(Cell::new(formation.default_effect())),
		}
	}

	/// Sets formation progress, clamped to `[0, 1]`. NaN is ignored.
	pub fn set_progress(&self, value: f64) {
		if value.is_nan() {
			return;
		}
		self.progress.set(value.clamp(0.0, 1.0) as f32);
	}

	/// Current formation progress.
	pub fn progress(&self) -> f32 {
		self.progress.get()
	}

	/// Switches the pointer force law from the next frame on.
	pub fn set_effect(&self, effect: EffectMode) {
		self.effect.set(effect);
	}

	/// Currently selected pointer effect.
	pub fn effect(&self) -> EffectMode {
		self.effect.get()
	}

	/// Both values at once, as the frame loop reads them.
	pub fn snapshot(&self) -> ControlSnapshot {
		ControlSnapshot {
			progress: self.progress.get(),
			effect: self.effect.get(),
		}
	}
}

impl Default for ParticleTextHandle {
	fn default() -> Self {
		Self::new(Formation::default())
	}
}
