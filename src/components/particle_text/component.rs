//! Leptos component wrapping the particle text canvas.
//!
//! The component owns at most one [`Session`]. Changing the text tears the
//! current session down and builds a new one (rasterize, scatter, fresh
//! positions and velocities). With reduced motion requested no session exists
//! at all and only the static heading is shown. Pointer, touch and
//! window resize events only reach the session's state through
//! [`Session::with_state`], so nothing touches a torn-down field.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

use super::config::EngineConfig;
use super::control::ParticleTextHandle;
use super::error::EngineError;
use super::lifecycle::{FrameCallback, Presentation, RafScheduler, RenderSurface, Session};
use super::motion::use_prefers_reduced_motion;
use super::raster::CanvasGlyphs;
use super::render::WebGlSurface;
use super::state::ParticleTextState;
use super::theme::Theme;

type BrowserSession = Session<RafScheduler, WebGlSurface>;
type SessionSlot = Rc<RefCell<Option<BrowserSession>>>;

/// Surface size used when the canvas has no laid-out parent yet.
const FALLBACK_SIZE: (f64, f64) = (800.0, 300.0);

/// Renders `text` as an interactive particle cloud.
///
/// The canvas fills its parent element. Pass a [`ParticleTextHandle`] to drive
/// formation progress and the pointer effect from outside; without one, a
/// handle matching the configured formation is created internally. When the
/// reduced-motion preference is set (or WebGL2 is unavailable) the text is
/// shown as a plain heading instead.
#[component]
pub fn ParticleText(
	#[prop(into)] text: Signal<String>,
	#[prop(into, optional)] class: String,
	#[prop(into, default = "particle-text".to_string())] instance_id: String,
	#[prop(optional)] handle: Option<ParticleTextHandle>,
	#[prop(optional)] config: Option<EngineConfig>,
	/// Overrides the `prefers-reduced-motion` media query.
	#[prop(optional, into)]
	reduced_motion: Option<Signal<bool>>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let handle = handle.unwrap_or_else(|| ParticleTextHandle::new(config.formation));
	let reduced_motion = reduced_motion.unwrap_or_else(use_prefers_reduced_motion);
	let theme = Theme::named(config.theme.as_deref());
	let (show_fallback, set_show_fallback) = signal(false);

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let session: SessionSlot = Rc::new(RefCell::new(None));
	let frames: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let session_frame = session.clone();
	*frames.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
		if let Some(ref mut s) = *session_frame.borrow_mut() {
			s.frame(timestamp);
		}
	}));

	let (session_init, frames_init, resize_init) = (session.clone(), frames.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let text = text.get();
		let reduced = reduced_motion.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if let Some(mut previous) = session_init.borrow_mut().take() {
			debug!("particle-text: rebuilding {:?} (reduced motion: {})", instance_id, reduced);
			previous.teardown();
		}
		if reduced {
			// The heading carries the text; no particle data is built for it.
			set_show_fallback.set(true);
		} else {
			match start_session(&canvas, &text, &instance_id, &handle, &config, &frames_init) {
				Ok(started) => {
					set_show_fallback.set(started.presentation() == Presentation::Static);
					*session_init.borrow_mut() = Some(started);
				}
				Err(e) => {
					warn!("particle-text: setup failed, showing static text: {}", e);
					set_show_fallback.set(true);
				}
			}
		}

		if resize_init.borrow().is_none() {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			let cb = Closure::<dyn FnMut()>::new(move || {
				let (w, h) = surface_size(&canvas_resize);
				debug!("particle-text: resize to {}x{}", w, h);
				if let Some(ref mut s) = *session_resize.borrow_mut() {
					s.resize(w, h);
				}
			});
			if let Some(window) = web_sys::window() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			*resize_init.borrow_mut() = Some(cb);
		}
	});

	let session_md = session.clone();
	let on_mousedown = move |ev: MouseEvent| {
		with_state(&session_md, |s| {
			s.drag_start(ev.client_x() as f64, ev.client_y() as f64)
		});
	};

	let session_mm = session.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y, w, h) = local_pointer(&canvas, ev.client_x(), ev.client_y());
		with_state(&session_mm, |s| {
			s.pointer_move(x, y, w, h);
			s.drag_move(ev.client_x() as f64, ev.client_y() as f64);
		});
	};

	let session_mu = session.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&session_mu, |s| s.drag_end());
	};

	let session_ml = session.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&session_ml, |s| s.pointer_leave());
	};

	// Single-finger touch mirrors the mouse: start hovers and grabs, move drags.
	let session_ts = session.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y, w, h) = local_pointer(&canvas, touch.client_x(), touch.client_y());
		with_state(&session_ts, |s| {
			s.pointer_move(x, y, w, h);
			s.drag_start(touch.client_x() as f64, touch.client_y() as f64);
		});
	};

	let session_tm = session.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y, w, h) = local_pointer(&canvas, touch.client_x(), touch.client_y());
		with_state(&session_tm, |s| {
			s.pointer_move(x, y, w, h);
			s.drag_move(touch.client_x() as f64, touch.client_y() as f64);
		});
	};

	let session_te = session.clone();
	let on_touchend = move |_: TouchEvent| {
		with_state(&session_te, |s| {
			s.drag_end();
			s.pointer_leave();
		});
	};

	let teardown = SendWrapper::new(move || {
		if let Some(mut s) = session.borrow_mut().take() {
			s.teardown();
		}
		frames.borrow_mut().take();
		if let Some(cb) = resize_cb.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		info!("particle-text: unmounted");
	});
	on_cleanup(move || teardown.take()());

	let wrapper_class = format!("particle-text {class}").trim_end().to_string();
	let fallback_color = theme.fallback.color.to_css();

	view! {
		<div class=wrapper_class style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="particle-text-canvas"
				role="img"
				aria-label=move || text.get()
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				style:display=move || if show_fallback.get() { "none" } else { "block" }
				style:cursor="grab"
				style:touch-action="none"
			/>
			<h2
				class=theme.fallback.class
				style:color=fallback_color
				style:display=move || if show_fallback.get() { "block" } else { "none" }
			>
				{move || text.get()}
			</h2>
		</div>
	}
}

/// Builds an animated session for the canvas' current size.
///
/// A missing WebGL2 context is not an error: the session simply starts in
/// static presentation.
fn start_session(
	canvas: &HtmlCanvasElement,
	text: &str,
	instance_id: &str,
	handle: &ParticleTextHandle,
	config: &EngineConfig,
	frames: &FrameCallback,
) -> Result<BrowserSession, EngineError> {
	let (width, height) = surface_size(canvas);
	let state = ParticleTextState::new(
		&CanvasGlyphs,
		text,
		instance_id,
		handle.clone(),
		config.clone(),
		width,
		height,
	)?;

	let surface = match WebGlSurface::new(canvas) {
		Ok(mut surface) => {
			surface.resize(width, height);
			Some(surface)
		}
		Err(e) => {
			warn!("particle-text: no drawing surface, showing static text: {}", e);
			None
		}
	};

	Ok(Session::start(state, RafScheduler::new(frames.clone())?, surface, false))
}

fn with_state(slot: &SessionSlot, f: impl FnOnce(&mut ParticleTextState)) {
	if let Some(ref mut s) = *slot.borrow_mut() {
		s.with_state(f);
	}
}

/// Parent element size, or [`FALLBACK_SIZE`] before layout.
fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or(FALLBACK_SIZE)
}

/// Client coordinates to canvas-local pixels, plus the canvas' CSS size.
fn local_pointer(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64, f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
		rect.width(),
		rect.height(),
	)
}
