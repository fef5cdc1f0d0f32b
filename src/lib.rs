//! particle-text: glyph-shaped particle clouds for the web.
//!
//! This crate provides a WASM-based Leptos component that rasterizes a string,
//! turns its opaque pixels into point particles, forms them from a scattered
//! cloud as an external progress value rises, and lets the pointer push them
//! around with one of several force effects.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::particle_text::{
	EffectMode, EngineConfig, EngineError, Formation, ParticleText, ParticleTextHandle, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("particle-text: logging initialized");
}

/// Page-level settings embedded in the host document.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
	/// Text to render.
	pub text: String,
	/// Identity that seeds the scattered cloud.
	pub instance_id: String,
	/// Engine tuning.
	pub engine: EngineConfig,
}

impl Default for PageConfig {
	fn default() -> Self {
		Self {
			text: "PARTICLES".to_string(),
			instance_id: "particle-text-demo".to_string(),
			engine: EngineConfig::default(),
		}
	}
}

/// Parses the page configuration document.
pub fn parse_page_config(json: &str) -> Result<PageConfig, serde_json::Error> {
	serde_json::from_str(json)
}

/// Load page settings from a script element with id="particle-text-config".
/// Expected format: JSON with { text, instance_id, engine: {...} }, every key optional.
fn load_page_config() -> Option<PageConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("particle-text-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_page_config(&json_text) {
		Ok(config) => {
			info!(
				"particle-text: loaded config for {:?} ({:?} formation)",
				config.text, config.engine.formation
			);
			Some(config)
		}
		Err(e) => {
			warn!("particle-text: failed to parse page config: {}", e);
			None
		}
	}
}

/// Fraction of the page scrolled, in `[0, 1]`. Zero when the page cannot scroll.
pub fn scroll_fraction(scroll_y: f64, scroll_height: f64, viewport_height: f64) -> f64 {
	let range = scroll_height - viewport_height;
	if range <= 0.0 {
		return 0.0;
	}
	(scroll_y / range).clamp(0.0, 1.0)
}

fn window_scroll_fraction(window: &Window) -> Option<f64> {
	let scroll_y = window.scroll_y().ok()?;
	let viewport = window.inner_height().ok()?.as_f64()?;
	let height = window.document()?.document_element()?.scroll_height() as f64;
	Some(scroll_fraction(scroll_y, height, viewport))
}

/// Main application component.
/// Loads settings from the DOM, maps page scroll to formation progress and
/// offers one button per pointer effect.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let page = load_page_config().unwrap_or_default();
	let handle = ParticleTextHandle::new(page.engine.formation);
	let (effect, set_effect) = signal(handle.effect());

	if let Some(window) = web_sys::window() {
		let (handle_scroll, window_scroll) = (handle.clone(), window.clone());
		let on_scroll = Closure::<dyn FnMut()>::new(move || {
			if let Some(fraction) = window_scroll_fraction(&window_scroll) {
				handle_scroll.set_progress(fraction);
			}
		});
		let _ = window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
		// The demo page lives as long as the document.
		on_scroll.forget();
	}

	let text = page.text.clone();
	let buttons = EffectMode::ALL
		.into_iter()
		.map(|mode| {
			let handle = handle.clone();
			view! {
				<button
					class="effect-button"
					class:active=move || effect.get() == mode
					on:click=move |_| {
						handle.set_effect(mode);
						set_effect.set(mode);
					}
				>
					{mode.label()}
				</button>
			}
		})
		.collect_view();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Particle Text" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="scroll-stage">
			<div class="sticky-hero">
				<ParticleText
					text=text
					instance_id=page.instance_id
					handle=handle
					config=page.engine
				/>
				<div class="effect-overlay">
					<p class="subtitle">"Scroll to form the text. Drag to rotate. Hover to disturb."</p>
					<div class="effect-buttons">{buttons}</div>
				</div>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn page_config_fills_missing_keys() {
		let config = parse_page_config(r#"{ "text": "HELLO", "engine": { "theme": "frost" } }"#).unwrap();
		assert_eq!(config.text, "HELLO");
		assert_eq!(config.instance_id, "particle-text-demo");
		assert_eq!(config.engine.theme.as_deref(), Some("frost"));
		assert_eq!(config.engine.formation, Formation::Progressive);
	}

	#[test]
	fn malformed_page_config_is_an_error() {
		assert!(parse_page_config("{ text: ").is_err());
	}

	#[test]
	fn scroll_fraction_is_clamped() {
		assert_eq!(scroll_fraction(0.0, 2000.0, 1000.0), 0.0);
		assert_eq!(scroll_fraction(500.0, 2000.0, 1000.0), 0.5);
		assert_eq!(scroll_fraction(1500.0, 2000.0, 1000.0), 1.0);
		assert_eq!(scroll_fraction(100.0, 800.0, 1000.0), 0.0);
	}
}
