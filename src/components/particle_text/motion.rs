//! `prefers-reduced-motion` as a reactive signal.

use leptos::prelude::*;
use log::{debug, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

/// Media query matched when the user asked the platform to minimize motion.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Tracks the reduced-motion preference for the lifetime of the calling owner.
///
/// Reads the query at call time and follows its `change` events; the listener
/// is removed when the owner is cleaned up. Without `matchMedia` the signal
/// stays `false`.
pub fn use_prefers_reduced_motion() -> Signal<bool> {
	let reduced = RwSignal::new(false);
	let Some(query) = web_sys::window().and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
	else {
		warn!("particle-text: matchMedia unavailable, assuming motion is allowed");
		return reduced.into();
	};
	reduced.set(query.matches());

	let watched = query.clone();
	let listener = Closure::<dyn FnMut()>::new(move || {
		let matches = watched.matches();
		debug!("particle-text: reduced motion preference changed to {}", matches);
		reduced.set(matches);
	});
	let _ = query.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref());

	let registration = SendWrapper::new((query, listener));
	on_cleanup(move || {
		let (query, listener) = registration.take();
		let _ = query.remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref());
	});

	reduced.into()
}
