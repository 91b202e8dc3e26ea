//! Frame driver: lifecycle, cancellation and resize settling.
//!
//! The host calls [`Animator::frame`] once per animation frame with its
//! clock and reschedules only while the result is [`FrameOutcome::Continue`].
//! A [`StopHandle`] cloned out of the animator ends the loop from anywhere on
//! the same thread.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::scene::Scene;
use crate::surface::Surface;

/// Lifecycle state of an [`Animator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No frame has run yet.
    Idle,
    Running,
    /// Terminal; no further frames are drawn.
    Stopped,
}

/// What the host should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Schedule another frame.
    Continue,
    /// Stop scheduling; the animator is finished.
    Stop,
}

type Teardown = Box<dyn FnOnce()>;

#[derive(Default)]
struct StopState {
    stopped: Cell<bool>,
    teardown: RefCell<Vec<Teardown>>,
}

/// Shared stop signal for an [`Animator`].
///
/// Hosts register teardown with [`on_stop`](Self::on_stop) to release event
/// listeners and frame callbacks. Teardown runs exactly once, on the first
/// [`stop`](Self::stop).
#[derive(Clone, Default)]
pub struct StopHandle {
    state: Rc<StopState>,
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.state.stopped.get())
            .field("teardown", &self.state.teardown.borrow().len())
            .finish()
    }
}

impl StopHandle {
    pub fn stop(&self) {
        if self.state.stopped.replace(true) {
            return;
        }
        // Drained before running so teardown may register or stop again.
        let pending = std::mem::take(&mut *self.state.teardown.borrow_mut());
        for teardown in pending {
            teardown();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.get()
    }

    /// Runs `teardown` when the handle is stopped, or right away if it
    /// already is.
    pub fn on_stop(&self, teardown: impl FnOnce() + 'static) {
        if self.is_stopped() {
            teardown();
        } else {
            self.state.teardown.borrow_mut().push(Box::new(teardown));
        }
    }
}

/// Coalesces bursts of resize events into one rebuild.
///
/// Every request pushes the deadline to `now + delay`; [`poll`](Self::poll)
/// fires once the clock passes the latest deadline.
#[derive(Debug, Clone)]
pub struct ResizeSettler {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl ResizeSettler {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Records a resize observed at `now_ms`.
    pub fn request(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending rebuild.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Drives a [`Scene`] one frame at a time.
pub struct Animator<S: Scene> {
    scene: S,
    state: DriverState,
    stop: StopHandle,
    settler: ResizeSettler,
    frames: u64,
}

impl<S: Scene> Animator<S> {
    pub fn new(scene: S, settle_delay_ms: f64) -> Self {
        Self {
            scene,
            state: DriverState::Idle,
            stop: StopHandle::default(),
            settler: ResizeSettler::new(settle_delay_ms),
            frames: 0,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// A handle that stops this animator when triggered.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&mut self) {
        self.stop.stop();
        self.halt();
    }

    fn halt(&mut self) {
        if self.state != DriverState::Stopped {
            info!("animation stopped after {} frames", self.frames);
        }
        self.state = DriverState::Stopped;
        self.settler.cancel();
    }

    /// Applies a new canvas size now and schedules a rebuild after the
    /// settle delay.
    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.scene.resize(width, height);
        self.settler.request(now_ms);
    }

    pub fn rebuild_pending(&self) -> bool {
        self.settler.is_pending()
    }

    /// Runs one frame at host time `now_ms`.
    ///
    /// Rebuilds first if a resize has settled, then ticks the scene.
    pub fn frame(&mut self, surface: &mut dyn Surface, now_ms: f64) -> FrameOutcome {
        if self.stop.is_stopped() {
            self.halt();
        }
        match self.state {
            DriverState::Stopped => return FrameOutcome::Stop,
            DriverState::Idle => {
                info!("animation started");
                self.state = DriverState::Running;
            }
            DriverState::Running => {}
        }
        if self.settler.poll(now_ms) {
            debug!("resize settled at {now_ms}ms, rebuilding");
            self.scene.rebuild();
        }
        self.scene.tick(surface);
        self.frames += 1;
        FrameOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_ACCENT;
    use crate::config::FieldConfig;
    use crate::field::ParticleField;
    use crate::prng::Xorshift64;
    use crate::surface::Recorder;

    fn animator(width: f64, height: f64) -> Animator<ParticleField> {
        let field = ParticleField::new(
            width,
            height,
            DEFAULT_ACCENT,
            FieldConfig::default(),
            Xorshift64::new(42),
        )
        .unwrap();
        Animator::new(field, 100.0)
    }

    #[test]
    fn first_frame_moves_idle_to_running() {
        let mut a = animator(200.0, 200.0);
        assert_eq!(a.state(), DriverState::Idle);
        let mut rec = Recorder::new(200.0, 200.0);
        assert_eq!(a.frame(&mut rec, 0.0), FrameOutcome::Continue);
        assert_eq!(a.state(), DriverState::Running);
        assert_eq!(a.frames(), 1);
    }

    #[test]
    fn stop_handle_ends_loop_and_nothing_is_drawn_after() {
        let mut a = animator(200.0, 200.0);
        let handle = a.stop_handle();
        let mut rec = Recorder::new(200.0, 200.0);
        a.frame(&mut rec, 0.0);
        handle.stop();
        rec.reset();
        assert_eq!(a.frame(&mut rec, 16.0), FrameOutcome::Stop);
        assert_eq!(a.frame(&mut rec, 32.0), FrameOutcome::Stop);
        assert!(rec.commands().is_empty());
        assert_eq!(a.state(), DriverState::Stopped);
        assert_eq!(a.frames(), 1);
    }

    #[test]
    fn stop_before_first_frame_never_runs() {
        let mut a = animator(200.0, 200.0);
        a.stop();
        let mut rec = Recorder::new(200.0, 200.0);
        assert_eq!(a.frame(&mut rec, 0.0), FrameOutcome::Stop);
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn resize_rebuilds_only_after_settle_delay() {
        let mut a = animator(800.0, 600.0);
        let mut rec = Recorder::new(800.0, 600.0);
        a.frame(&mut rec, 0.0);
        assert_eq!(a.scene().len(), 48);

        a.resize(400.0, 300.0, 1000.0);
        a.frame(&mut rec, 1050.0);
        assert_eq!(a.scene().len(), 48, "not settled yet");
        assert_eq!(a.scene().width(), 400.0, "size applies immediately");

        a.frame(&mut rec, 1100.0);
        assert_eq!(a.scene().len(), 12);
        assert!(!a.rebuild_pending());
    }

    #[test]
    fn rapid_resizes_coalesce_into_one_rebuild() {
        let mut a = animator(800.0, 600.0);
        let mut rec = Recorder::new(800.0, 600.0);
        a.resize(700.0, 500.0, 0.0);
        a.resize(600.0, 400.0, 50.0);
        a.resize(400.0, 300.0, 90.0);
        a.frame(&mut rec, 150.0);
        assert_eq!(a.scene().len(), 48, "deadline moved to 190ms");
        a.frame(&mut rec, 190.0);
        assert_eq!(a.scene().len(), 12);
    }

    #[test]
    fn stopping_cancels_pending_rebuild() {
        let mut a = animator(800.0, 600.0);
        a.resize(400.0, 300.0, 0.0);
        a.stop();
        assert!(!a.rebuild_pending());
        a.resize(100.0, 100.0, 10.0);
        assert!(!a.rebuild_pending());
    }

    #[test]
    fn teardown_runs_once_on_first_stop() {
        let handle = StopHandle::default();
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        handle.on_stop(move || counter.set(counter.get() + 1));
        assert_eq!(runs.get(), 0);
        let other = handle.clone();
        handle.stop();
        other.stop();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn teardown_registered_after_stop_runs_immediately() {
        let handle = StopHandle::default();
        handle.stop();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        handle.on_stop(move || flag.set(true));
        assert!(ran.get());
    }

    #[test]
    fn teardown_releases_captured_state() {
        // A listener closure pinning shared state is dropped on stop, so the
        // state is freed once the host lets go of it.
        let mut a = animator(200.0, 200.0);
        let pinned = Rc::new(RefCell::new(Vec::<u8>::new()));
        let held = pinned.clone();
        a.stop_handle().on_stop(move || drop(held));
        assert_eq!(Rc::strong_count(&pinned), 2);
        a.stop();
        assert_eq!(Rc::strong_count(&pinned), 1);
    }

    #[test]
    fn animator_stop_runs_teardown() {
        let mut a = animator(200.0, 200.0);
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        a.stop_handle().on_stop(move || flag.set(true));
        let mut rec = Recorder::new(200.0, 200.0);
        a.frame(&mut rec, 0.0);
        assert!(!ran.get());
        a.stop();
        assert!(ran.get());
        assert_eq!(a.frame(&mut rec, 16.0), FrameOutcome::Stop);
    }

    #[test]
    fn settler_fires_once() {
        let mut s = ResizeSettler::new(100.0);
        assert!(!s.poll(1e9));
        s.request(0.0);
        assert!(!s.poll(99.0));
        assert!(s.poll(100.0));
        assert!(!s.poll(200.0));
    }
}
