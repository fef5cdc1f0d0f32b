//! Pointer picking against the text plane.
//!
//! # Coordinate Spaces
//!
//! - **Surface space**: CSS pixels relative to the canvas' top-left corner.
//! - **NDC**: `[-1, 1]` on both axes, +y up.
//! - **World space**: camera on +z looking at the origin; the interaction
//!   plane is `z = 0`.
//! - **Local space**: the particle field's own frame. The field is rotated by
//!   drag gestures, so world hits are brought into local space with the
//!   inverse of the field rotation before any force is computed.

use glam::{Mat4, Quat, Vec2, Vec3};

use super::config::CameraConfig;

/// Rays closer than this to parallel with the plane never hit it.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A half-line from `origin` along unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
	/// Ray start.
	pub origin: Vec3,
	/// Unit direction.
	pub direction: Vec3,
}

impl Ray {
	/// Intersection with the plane through the origin with normal `normal`.
	///
	/// Returns `None` when the ray runs parallel to the plane or the plane lies
	/// behind the ray origin.
	pub fn intersect_plane(&self, normal: Vec3) -> Option<Vec3> {
		let denom = normal.dot(self.direction);
		if denom.abs() < PARALLEL_EPSILON {
			return None;
		}
		let t = -normal.dot(self.origin) / denom;
		(t >= 0.0).then(|| self.origin + self.direction * t)
	}
}

/// Perspective camera looking down -z at the text plane.
#[derive(Clone, Debug)]
pub struct Camera {
	/// Camera position; it always looks at the origin.
	pub eye: Vec3,
	/// Vertical field of view in radians.
	pub fov_y: f32,
	/// Width over height.
	pub aspect: f32,
	/// Near clip distance.
	pub near: f32,
	/// Far clip distance.
	pub far: f32,
}

impl Camera {
	/// Camera for a `width` x `height` surface.
	pub fn new(config: &CameraConfig, width: f64, height: f64) -> Self {
		Self {
			eye: Vec3::new(0.0, 0.0, config.distance),
			fov_y: config.fov_degrees.to_radians(),
			aspect: aspect_ratio(width, height),
			near: config.near,
			far: config.far,
		}
	}

	/// Re-derives the aspect ratio after the surface changed size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.aspect = aspect_ratio(width, height);
	}

	/// World to camera transform.
	pub fn view(&self) -> Mat4 {
		Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
	}

	/// OpenGL-style perspective projection.
	pub fn projection(&self) -> Mat4 {
		Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
	}

	/// Projection times view.
	pub fn view_projection(&self) -> Mat4 {
		self.projection() * self.view()
	}

	/// Ray from the eye through an NDC point.
	pub fn ray(&self, ndc: Vec2) -> Ray {
		let inv = self.view_projection().inverse();
		let through = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
		Ray {
			origin: self.eye,
			direction: (through - self.eye).normalize(),
		}
	}

	/// World-space hit on the `z = 0` plane under a surface-space pointer.
	pub fn pick(&self, pointer: Vec2, surface: Vec2) -> Option<Vec3> {
		let ndc = pointer_to_ndc(pointer, surface)?;
		self.ray(ndc).intersect_plane(Vec3::Z)
	}
}

fn aspect_ratio(width: f64, height: f64) -> f32 {
	if width > 0.0 && height > 0.0 {
		(width / height) as f32
	} else {
		1.0
	}
}

/// Surface pixels to NDC; `None` for a zero-sized surface.
pub fn pointer_to_ndc(pointer: Vec2, surface: Vec2) -> Option<Vec2> {
	if surface.x <= 0.0 || surface.y <= 0.0 {
		return None;
	}
	Some(Vec2::new(
		pointer.x / surface.x * 2.0 - 1.0,
		-(pointer.y / surface.y) * 2.0 + 1.0,
	))
}

/// Field orientation for Euler angles applied in X then Y order.
pub fn field_rotation(rotation: Vec2) -> Quat {
	Quat::from_rotation_x(rotation.x) * Quat::from_rotation_y(rotation.y)
}

/// Brings a world-space point into the field's local frame.
pub fn to_local(world: Vec3, rotation: Vec2) -> Vec3 {
	field_rotation(rotation).inverse() * world
}
