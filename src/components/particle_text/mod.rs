//! Particle text formation and interaction.
//!
//! Renders a string as a cloud of point particles that:
//! - Form the text from a deterministic scattered cloud as progress goes 0 to 1
//! - Swirl gently around their targets once formed
//! - React to the pointer with one of four force effects
//! - Rotate with click-and-drag, easing towards the drag target
//!
//! Without WebGL2 or with reduced motion requested, the text is shown as a
//! static heading instead.
//!
//! # Example
//!
//! ```ignore
//! use particle_text::{EffectMode, ParticleText, ParticleTextHandle};
//!
//! let handle = ParticleTextHandle::default();
//! handle.set_effect(EffectMode::Vortex);
//!
//! view! { <ParticleText text="HELLO" handle=handle.clone() /> }
//!
//! // Later, from a scroll listener:
//! handle.set_progress(0.6);
//! ```

mod component;
pub mod config;
mod control;
mod error;
pub mod field;
pub mod forces;
pub mod interaction;
pub mod lifecycle;
mod motion;
pub mod physics;
pub mod raster;
pub mod raycast;
pub mod render;
pub mod scatter;
mod state;
pub mod theme;

pub use component::ParticleText;
pub use config::{EngineConfig, Formation};
pub use control::{ControlSnapshot, ParticleTextHandle};
pub use error::EngineError;
pub use forces::EffectMode;
pub use lifecycle::{FrameRequest, FrameScheduler, Presentation, RenderSurface, Session};
pub use motion::use_prefers_reduced_motion;
pub use raster::{CanvasGlyphs, GlyphRasterizer};
pub use state::ParticleTextState;
pub use theme::Theme;
