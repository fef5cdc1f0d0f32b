//! Visual theming for the particle text.
//!
//! Provides particle colors, point sprite style and the static fallback style.

use glam::Vec3;

use super::physics::Shading;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Linear RGB in `[0, 1]` for vertex colors.
	pub fn to_vec3(self) -> Vec3 {
		Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
	}

	/// CSS hex or `rgba()` notation.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Particle colors and point sprite configuration.
#[derive(Clone, Debug)]
pub struct ParticleStyle {
	/// Color at rest
	pub color: Color,
	/// Color at the rim of the pointer's influence
	pub edge_color: Color,
	/// Point size in world units (perspective-attenuated)
	pub size: f32,
	/// Point opacity
	pub opacity: f32,
}

/// Static text shown when motion is reduced or no drawing context exists.
#[derive(Clone, Debug)]
pub struct FallbackStyle {
	/// Text color.
	pub color: Color,
	/// CSS class applied to the heading
	pub class: &'static str,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Preset name, as accepted by [`Theme::named`].
	pub name: &'static str,
	/// Point cloud style.
	pub particles: ParticleStyle,
	/// Surface clear color (usually fully transparent)
	pub clear: Color,
	/// Static heading style.
	pub fallback: FallbackStyle,
}

impl Theme {
	/// White particles graying near the pointer (default)
	pub fn monochrome() -> Self {
		let white = Color::rgb(255, 255, 255);
		Self {
			name: "monochrome",
			particles: ParticleStyle {
				color: white,
				edge_color: white.darken(0.3),
				size: 0.01,
				opacity: 0.9,
			},
			clear: Color::rgba(0, 0, 0, 0.0),
			fallback: FallbackStyle {
				color: white,
				class: "particle-text-fallback",
			},
		}
	}

	/// Pale blue particles deepening to cyan under the pointer
	pub fn frost() -> Self {
		let frost = Color::rgb(200, 228, 255);
		Self {
			name: "frost",
			particles: ParticleStyle {
				color: frost,
				edge_color: Color::rgb(64, 160, 220),
				size: 0.012,
				opacity: 0.85,
			},
			clear: Color::rgba(0, 0, 0, 0.0),
			fallback: FallbackStyle {
				color: frost,
				class: "particle-text-fallback",
			},
		}
	}

	/// Looks up a preset by name, defaulting to [`Theme::monochrome`].
	pub fn named(name: Option<&str>) -> Self {
		match name {
			Some("frost") => Self::frost(),
			_ => Self::monochrome(),
		}
	}

	/// Colors used by the integrator's proximity shading.
	pub fn shading(&self) -> Shading {
		Shading {
			base: self.particles.color.to_vec3(),
			edge: self.particles.edge_color.to_vec3(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::monochrome()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn monochrome_shading_matches_gray_falloff() {
		let shading = Theme::monochrome().shading();
		assert_eq!(shading.base, Vec3::ONE);
		assert!((shading.edge.x - 0.7).abs() < 0.01);
	}

	#[test]
	fn unknown_names_fall_back_to_default() {
		assert_eq!(Theme::named(Some("nope")).name, "monochrome");
		assert_eq!(Theme::named(None).name, "monochrome");
		assert_eq!(Theme::named(Some("frost")).name, "frost");
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}
}
