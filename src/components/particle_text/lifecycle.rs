//! Frame loop ownership and teardown.
//!
//! A [`Session`] binds one simulation state to one frame scheduler and one
//! render surface. It requests the next frame at the end of each frame, never
//! touches the state after teardown, and releases the surface exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::Window;

use super::error::EngineError;
use super::state::ParticleTextState;

/// Identifier of a pending frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest(pub i32);

/// Source of display-refresh callbacks.
pub trait FrameScheduler {
	/// Asks for one callback on the next refresh. `None` if the host refused.
	fn request_frame(&mut self) -> Option<FrameRequest>;
	/// Withdraws a pending request.
	fn cancel_frame(&mut self, request: FrameRequest);
}

/// Shared slot holding the JS callback that drives a session's frames.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` on the browser window.
pub struct RafScheduler {
	window: Window,
	callback: FrameCallback,
}

impl RafScheduler {
	/// Scheduler driving `callback`, which must stay set for as long as frames are wanted.
	pub fn new(callback: FrameCallback) -> Result<Self, EngineError> {
		let window = web_sys::window().ok_or(EngineError::NoWindow)?;
		Ok(Self { window, callback })
	}
}

impl FrameScheduler for RafScheduler {
	fn request_frame(&mut self) -> Option<FrameRequest> {
		let callback = self.callback.borrow();
		let callback = callback.as_ref()?;
		match self
			.window
			.request_animation_frame(callback.as_ref().unchecked_ref())
		{
			Ok(id) => Some(FrameRequest(id)),
			Err(e) => {
				warn!("particle-text: requestAnimationFrame failed: {}", EngineError::from(e));
				None
			}
		}
	}

	fn cancel_frame(&mut self, request: FrameRequest) {
		let _ = self.window.cancel_animation_frame(request.0);
	}
}

/// Drawing target for the particle cloud.
pub trait RenderSurface {
	/// The host element changed size (CSS pixels).
	fn resize(&mut self, width: f64, height: f64);
	/// Presents one frame.
	fn draw(&mut self, state: &ParticleTextState);
	/// Frees GPU-side resources. Called at most once.
	fn release(&mut self);
}

/// How the session presents its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presentation {
	/// Frame loop running, particles drawn every refresh.
	Animated,
	/// No frame loop; the static text fallback is shown.
	Static,
}

/// One live frame loop over one particle field.
pub struct Session<S: FrameScheduler, R: RenderSurface> {
	state: ParticleTextState,
	scheduler: S,
	surface: Option<R>,
	pending: Option<FrameRequest>,
	presentation: Presentation,
	alive: bool,
}

impl<S: FrameScheduler, R: RenderSurface> Session<S, R> {
	/// Starts a session.
	///
	/// With `reduced_motion` set or without a surface, no frame is ever
	/// requested and the session stays [`Presentation::Static`]. Reduced
	/// motion also pins the state formed, so particles rest on their targets
	/// whatever the handle's progress is.
	pub fn start(state: ParticleTextState, scheduler: S, surface: Option<R>, reduced_motion: bool) -> Self {
		let mut session = Self {
			state,
			scheduler,
			surface,
			pending: None,
			presentation: Presentation::Static,
			alive: true,
		};

		if reduced_motion {
			session.state.pin_formed();
		}
		if reduced_motion || session.surface.is_none() {
			debug!(
				"particle-text: static presentation (reduced motion: {}, surface: {})",
				reduced_motion,
				session.surface.is_some()
			);
			if let Some(mut surface) = session.surface.take() {
				surface.release();
			}
			return session;
		}

		session.presentation = Presentation::Animated;
		session.pending = session.scheduler.request_frame();
		session
	}

	/// Frame callback. Returns `false` when the session is no longer animating
	/// and the callback was ignored.
	pub fn frame(&mut self, timestamp_ms: f64) -> bool {
		if !self.alive || self.presentation != Presentation::Animated {
			return false;
		}
		self.pending = None;
		self.state.tick(timestamp_ms);
		if let Some(surface) = self.surface.as_mut() {
			surface.draw(&self.state);
		}
		self.pending = self.scheduler.request_frame();
		true
	}

	/// Forwards a surface size change to the camera and the surface. Ignored after teardown.
	pub fn resize(&mut self, width: f64, height: f64) {
		if !self.alive {
			return;
		}
		self.state.resize(width, height);
		if let Some(surface) = self.surface.as_mut() {
			surface.resize(width, height);
		}
	}

	/// Read access for presentation and diagnostics.
	pub fn state(&self) -> &ParticleTextState {
		&self.state
	}

	/// Runs `f` on the state unless the session was torn down.
	///
	/// Event handlers use this to update pointer state between frames.
	pub fn with_state(&mut self, f: impl FnOnce(&mut ParticleTextState)) {
		if self.alive {
			f(&mut self.state);
		}
	}

	/// Whether the session animates or shows the static text.
	pub fn presentation(&self) -> Presentation {
		self.presentation
	}

	/// `false` once torn down.
	pub fn is_alive(&self) -> bool {
		self.alive
	}

	/// Cancels the pending frame and releases the surface. Safe to call any
	/// number of times; returns `false` if the session was already torn down.
	pub fn teardown(&mut self) -> bool {
		if !self.alive {
			return false;
		}
		self.alive = false;
		if let Some(request) = self.pending.take() {
			self.scheduler.cancel_frame(request);
		}
		if let Some(mut surface) = self.surface.take() {
			surface.release();
		}
		info!("particle-text: session torn down");
		true
	}
}

impl<S: FrameScheduler, R: RenderSurface> Drop for Session<S, R> {
	fn drop(&mut self) {
		self.teardown();
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::particle_text::control::ParticleTextHandle;
	use crate::components::particle_text::state::tests::build;

	#[derive(Debug, Default)]
	struct Counters {
		requested: usize,
		cancelled: Vec<FrameRequest>,
		draws: usize,
		releases: usize,
		resizes: Vec<(f64, f64)>,
	}

	#[derive(Clone, Default)]
	struct FakeScheduler(Rc<RefCell<Counters>>);

	impl FrameScheduler for FakeScheduler {
		fn request_frame(&mut self) -> Option<FrameRequest> {
			let mut c = self.0.borrow_mut();
			c.requested += 1;
			Some(FrameRequest(c.requested as i32))
		}

		fn cancel_frame(&mut self, request: FrameRequest) {
			self.0.borrow_mut().cancelled.push(request);
		}
	}

	struct FakeSurface(Rc<RefCell<Counters>>);

	impl RenderSurface for FakeSurface {
		fn resize(&mut self, width: f64, height: f64) {
			self.0.borrow_mut().resizes.push((width, height));
		}

		fn draw(&mut self, _state: &ParticleTextState) {
			self.0.borrow_mut().draws += 1;
		}

		fn release(&mut self) {
			self.0.borrow_mut().releases += 1;
		}
	}

	fn start(reduced_motion: bool) -> (Session<FakeScheduler, FakeSurface>, Rc<RefCell<Counters>>) {
		let counters = Rc::new(RefCell::new(Counters::default()));
		let session = Session::start(
			build("AB", "lifecycle", ParticleTextHandle::default()),
			FakeScheduler(counters.clone()),
			Some(FakeSurface(counters.clone())),
			reduced_motion,
		);
		(session, counters)
	}

	#[test]
	fn each_frame_requests_the_next() {
		let (mut session, counters) = start(false);
		assert_eq!(counters.borrow().requested, 1);
		for i in 1..=3 {
			assert!(session.frame(i as f64 * 16.0));
		}
		let c = counters.borrow();
		assert_eq!(c.requested, 4);
		assert_eq!(c.draws, 3);
	}

	#[test]
	fn reduced_motion_never_schedules() {
		let (mut session, counters) = start(true);
		assert_eq!(session.presentation(), Presentation::Static);
		assert_eq!(session.state().field.positions(), session.state().field.targets());

		// Five simulated seconds of stray callbacks.
		let mut t = 0.0;
		while t <= 5_000.0 {
			assert!(!session.frame(t));
			t += 1000.0 / 60.0;
		}
		let c = counters.borrow();
		assert_eq!(c.requested, 0);
		assert_eq!(c.draws, 0);
		assert_eq!(c.releases, 1);
		drop(c);
		assert_eq!(session.state().field.positions(), session.state().field.targets());
	}

	#[test]
	fn reduced_motion_leaves_the_handle_alone() {
		let controls = ParticleTextHandle::default();
		controls.set_progress(0.2);
		let counters = Rc::new(RefCell::new(Counters::default()));
		let session = Session::start(
			build("AB", "lifecycle", controls.clone()),
			FakeScheduler(counters.clone()),
			Some(FakeSurface(counters.clone())),
			true,
		);
		assert!(session.state().is_pinned_formed());
		assert_eq!(session.state().field.positions(), session.state().field.targets());
		assert_eq!(controls.progress(), 0.2);
	}

	#[test]
	fn missing_surface_falls_back_to_static() {
		let counters = Rc::new(RefCell::new(Counters::default()));
		let mut session: Session<FakeScheduler, FakeSurface> = Session::start(
			build("AB", "lifecycle", ParticleTextHandle::default()),
			FakeScheduler(counters.clone()),
			None,
			false,
		);
		assert_eq!(session.presentation(), Presentation::Static);
		assert!(!session.frame(16.0));
		assert_eq!(counters.borrow().requested, 0);
	}

	#[test]
	fn teardown_is_idempotent() {
		let (mut session, counters) = start(false);
		session.frame(16.0);
		assert!(session.teardown());
		assert!(!session.teardown());
		drop(session);
		let c = counters.borrow();
		assert_eq!(c.cancelled, vec![FrameRequest(2)]);
		assert_eq!(c.releases, 1);
	}

	#[test]
	fn late_frames_after_teardown_touch_nothing() {
		let (mut session, counters) = start(false);
		session.with_state(|s| s.pointer_move(800.0, 200.0, 1600.0, 400.0));
		session.frame(16.0);
		session.teardown();

		let positions: Vec<Vec3> = session.state().field.positions().to_vec();
		let requested = counters.borrow().requested;
		assert!(!session.frame(32.0));
		session.with_state(|s| s.pointer_leave());
		session.resize(10.0, 10.0);

		assert_eq!(session.state().field.positions(), positions.as_slice());
		assert!(session.state().interaction.world_hit.is_some());
		assert_eq!(counters.borrow().requested, requested);
		assert!(counters.borrow().resizes.is_empty());
	}

	#[test]
	fn resize_reaches_camera_and_surface() {
		let (mut session, counters) = start(false);
		session.resize(800.0, 400.0);
		assert_eq!(session.state().camera.aspect, 2.0);
		assert_eq!(counters.borrow().resizes, vec![(800.0, 400.0)]);
	}

	#[test]
	fn dropping_a_live_session_releases_it() {
		let (session, counters) = start(false);
		drop(session);
		let c = counters.borrow();
		assert_eq!(c.releases, 1);
		assert_eq!(c.cancelled.len(), 1);
	}
}
