//! Pointer hover and drag-to-rotate state.
//!
//! Event handlers only touch this struct; the frame loop reads it, eases the
//! rotation and derives the local-space interaction point from it.

use glam::{Vec2, Vec3};

use super::config::InteractionConfig;
use super::raycast;

/// Ephemeral per-field pointer state.
#[derive(Clone, Debug, Default)]
pub struct InteractionState {
	/// Last hit on the interaction plane, in world space.
	pub world_hit: Option<Vec3>,
	/// `world_hit` in the field's local frame, refreshed every frame.
	pub local_hit: Option<Vec3>,
	/// Rotation currently applied to the field (x, y), in radians.
	pub rotation: Vec2,
	/// Rotation the field eases towards.
	pub target_rotation: Vec2,
	/// A drag rotation is in progress.
	pub dragging: bool,
	/// Client position of the last drag event.
	pub previous_pointer: Vec2,
}

impl InteractionState {
	/// Records the hover hit under the pointer (or its absence).
	pub fn hover(&mut self, world_hit: Option<Vec3>) {
		if world_hit.is_some() {
			self.world_hit = world_hit;
		}
	}

	/// Begins a drag rotation at client position `pointer`.
	pub fn drag_start(&mut self, pointer: Vec2) {
		self.dragging = true;
		self.previous_pointer = pointer;
	}

	/// Accumulates a drag delta into the target rotation. Ignored unless a drag
	/// is in progress.
	pub fn drag_move(&mut self, pointer: Vec2, config: &InteractionConfig) {
		if !self.dragging {
			return;
		}
		let delta = pointer - self.previous_pointer;
		self.target_rotation.y -= delta.x * config.drag_sensitivity;
		self.target_rotation.x -= delta.y * config.drag_sensitivity;
		self.previous_pointer = pointer;
	}

	/// Ends the drag; the rotation keeps easing to its target.
	pub fn drag_end(&mut self) {
		self.dragging = false;
	}

	/// Pointer left the surface: forget the hit and end any drag.
	pub fn leave(&mut self) {
		self.world_hit = None;
		self.local_hit = None;
		self.dragging = false;
	}

	/// Eases the rotation towards its target and refreshes `local_hit`.
	pub fn advance(&mut self, config: &InteractionConfig) -> Option<Vec3> {
		self.rotation += (self.target_rotation - self.rotation) * config.rotation_smoothing;
		self.local_hit = self.world_hit.map(|hit| raycast::to_local(hit, self.rotation));
		self.local_hit
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn drag_accumulates_inverted_deltas() {
		let config = InteractionConfig::default();
		let mut state = InteractionState::default();
		state.drag_start(Vec2::new(100.0, 100.0));
		state.drag_move(Vec2::new(120.0, 90.0), &config);
		state.drag_move(Vec2::new(140.0, 90.0), &config);
		assert!((state.target_rotation.y - -0.2).abs() < 1e-6);
		assert!((state.target_rotation.x - 0.05).abs() < 1e-6);
		assert_eq!(state.previous_pointer, Vec2::new(140.0, 90.0));
	}

	#[test]
	fn moves_without_drag_do_not_rotate() {
		let config = InteractionConfig::default();
		let mut state = InteractionState::default();
		state.drag_move(Vec2::new(500.0, 500.0), &config);
		state.drag_start(Vec2::ZERO);
		state.drag_end();
		state.drag_move(Vec2::new(50.0, 50.0), &config);
		assert_eq!(state.target_rotation, Vec2::ZERO);
	}

	#[test]
	fn rotation_eases_towards_target() {
		let config = InteractionConfig::default();
		let mut state = InteractionState {
			target_rotation: Vec2::new(1.0, -1.0),
			..Default::default()
		};
		state.advance(&config);
		assert!((state.rotation.x - 0.1).abs() < 1e-6);
		for _ in 0..200 {
			state.advance(&config);
		}
		assert!((state.rotation - state.target_rotation).length() < 1e-6);
	}

	#[test]
	fn leave_clears_hits_and_drag() {
		let config = InteractionConfig::default();
		let mut state = InteractionState::default();
		state.hover(Some(Vec3::new(0.1, 0.1, 0.0)));
		state.drag_start(Vec2::ZERO);
		assert!(state.advance(&config).is_some());
		state.leave();
		assert!(!state.dragging);
		assert_eq!(state.advance(&config), None);
	}

	#[test]
	fn local_hit_tracks_rotation() {
		let config = InteractionConfig {
			rotation_smoothing: 1.0,
			..Default::default()
		};
		let mut state = InteractionState {
			target_rotation: Vec2::new(0.0, std::f32::consts::FRAC_PI_2),
			..Default::default()
		};
		state.hover(Some(Vec3::new(0.0, 0.0, -1.0)));
		let local = state.advance(&config).unwrap();
		assert!((local - Vec3::X).length() < 1e-4, "{local:?}");
	}
}
