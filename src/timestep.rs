//! Fixed timestep loop
//!
//! Decouples the simulation rate from the display rate. The host calls
//! [`GameLoop::on_animation_frame`] from its frame callback with a timestamp in
//! seconds; the loop accumulates elapsed time and drains it in constant steps,
//! then runs the variable-rate frame callback once.

use crate::consts::MAX_FRAME_DT;

/// Host frame scheduling (requestAnimationFrame and friends)
pub trait FrameScheduler {
    type Handle: Copy;

    /// Ask the host for one more frame callback
    fn request_frame(&mut self) -> Self::Handle;

    /// Cancel a pending request
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Scheduler for hosts that pump frames themselves (tests, headless runs)
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    /// Total requests made
    pub requested: u32,
    /// Handles cancelled, in order
    pub cancelled: Vec<u32>,
    pending: Option<u32>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame has been requested and not yet delivered or cancelled
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u32;

    fn request_frame(&mut self) -> u32 {
        self.requested += 1;
        self.pending = Some(self.requested);
        self.requested
    }

    fn cancel_frame(&mut self, handle: u32) {
        self.cancelled.push(handle);
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Accumulator loop calling `on_fixed(step)` at a constant rate and
/// `on_frame(raw_dt)` once per host frame
pub struct GameLoop<S, F, R>
where
    S: FrameScheduler,
    F: FnMut(f32),
    R: FnMut(f32),
{
    scheduler: S,
    on_fixed: F,
    on_frame: R,
    step: f64,
    max_frame_dt: f64,
    accumulator: f64,
    last_time: f64,
    running: bool,
    pending: Option<S::Handle>,
    /// Fixed ticks run since construction
    pub ticks: u64,
}

impl<S, F, R> GameLoop<S, F, R>
where
    S: FrameScheduler,
    F: FnMut(f32),
    R: FnMut(f32),
{
    /// 60 Hz loop
    pub fn new(scheduler: S, on_fixed: F, on_frame: R) -> Self {
        Self::with_rate(scheduler, on_fixed, on_frame, 60.0)
    }

    pub fn with_rate(scheduler: S, on_fixed: F, on_frame: R, hz: f64) -> Self {
        assert!(hz > 0.0, "tick rate must be positive, got {}", hz);
        Self {
            scheduler,
            on_fixed,
            on_frame,
            step: 1.0 / hz,
            max_frame_dt: MAX_FRAME_DT,
            accumulator: 0.0,
            last_time: 0.0,
            running: false,
            pending: None,
            ticks: 0,
        }
    }

    /// Override the per-frame clamp (seconds)
    pub fn with_max_frame_dt(mut self, max_frame_dt: f64) -> Self {
        self.max_frame_dt = max_frame_dt;
        self
    }

    /// Begin ticking; `now` is the host clock in seconds. No-op if running.
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = now;
        self.pending = Some(self.scheduler.request_frame());
        log::debug!("Game loop started ({:.1} Hz)", 1.0 / self.step);
    }

    /// Cancel the pending frame and halt ticking
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.running {
            log::debug!("Game loop stopped after {} ticks", self.ticks);
        }
        self.running = false;
    }

    /// Host frame callback. Ignored when stopped.
    pub fn on_animation_frame(&mut self, now: f64) {
        if !self.running {
            return;
        }
        self.pending = None;

        let dt = now - self.last_time;
        self.last_time = now;
        self.advance(dt);

        self.pending = Some(self.scheduler.request_frame());
    }

    /// Feed one raw frame delta. Returns the number of fixed ticks run.
    pub fn advance(&mut self, dt: f64) -> u32 {
        self.accumulator += dt.clamp(0.0, self.max_frame_dt);

        let mut substeps = 0;
        while self.accumulator >= self.step {
            (self.on_fixed)(self.step as f32);
            self.accumulator -= self.step;
            substeps += 1;
        }
        self.ticks += u64::from(substeps);

        (self.on_frame)(dt as f32);
        substeps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step) as f32
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<f32>>>;

    fn counting_loop(
        hz: f64,
    ) -> (
        GameLoop<ManualScheduler, impl FnMut(f32), impl FnMut(f32)>,
        Calls,
        Calls,
    ) {
        let fixed: Calls = Rc::new(RefCell::new(Vec::new()));
        let frames: Calls = Rc::new(RefCell::new(Vec::new()));
        let f = fixed.clone();
        let r = frames.clone();
        let game_loop = GameLoop::with_rate(
            ManualScheduler::new(),
            move |dt| f.borrow_mut().push(dt),
            move |dt| r.borrow_mut().push(dt),
            hz,
        );
        (game_loop, fixed, frames)
    }

    #[test]
    fn test_three_steps_of_input_run_three_ticks() {
        let (mut game_loop, fixed, frames) = counting_loop(60.0);
        let step = game_loop.step();
        for _ in 0..3 {
            game_loop.advance(step);
        }
        assert_eq!(fixed.borrow().len(), 3);
        assert_eq!(frames.borrow().len(), 3);
    }

    #[test]
    fn test_uneven_deltas_drain_exactly() {
        // 1/64 s steps are exact in binary floating point
        let (mut game_loop, fixed, frames) = counting_loop(64.0);
        let step = game_loop.step();
        for dt in [step * 0.5, step * 1.25, step * 0.25, step, step * 0.5, step * 0.5] {
            game_loop.advance(dt);
        }
        // Total = 4 steps
        assert_eq!(fixed.borrow().len(), 4);
        assert_eq!(frames.borrow().len(), 6);
        assert!(fixed.borrow().iter().all(|&dt| dt == (1.0f64 / 64.0) as f32));
    }

    #[test]
    fn test_stall_is_clamped() {
        let (mut game_loop, fixed, frames) = counting_loop(64.0);
        let ran = game_loop.advance(10.0);
        // 0.25 s at 64 Hz
        assert_eq!(ran, 16);
        assert_eq!(fixed.borrow().len(), 16);
        // Frame callback sees the raw delta
        assert_eq!(*frames.borrow(), vec![10.0]);
    }

    #[test]
    fn test_remainder_carries_over() {
        let (mut game_loop, fixed, _) = counting_loop(64.0);
        let step = game_loop.step();
        assert_eq!(game_loop.advance(step * 0.75), 0);
        assert_eq!(game_loop.alpha(), 0.75);
        assert_eq!(game_loop.advance(step * 0.5), 1);
        assert_eq!(game_loop.alpha(), 0.25);
        assert_eq!(fixed.borrow().len(), 1);
    }

    #[test]
    fn test_repeated_start_requests_once() {
        let (mut game_loop, _, _) = counting_loop(60.0);
        game_loop.start(0.0);
        game_loop.start(0.0);
        assert_eq!(game_loop.scheduler().requested, 1);
        assert!(game_loop.is_running());
    }

    #[test]
    fn test_frames_drive_ticks_and_reschedule() {
        let (mut game_loop, fixed, frames) = counting_loop(64.0);
        game_loop.start(1.0);
        game_loop.on_animation_frame(1.0 + 1.0 / 64.0);
        game_loop.on_animation_frame(1.0 + 2.0 / 64.0);

        assert_eq!(fixed.borrow().len(), 2);
        assert_eq!(frames.borrow().len(), 2);
        assert_eq!(game_loop.scheduler().requested, 3);
        assert!(game_loop.scheduler().has_pending());
    }

    #[test]
    fn test_stop_cancels_and_halts() {
        let (mut game_loop, fixed, frames) = counting_loop(64.0);
        game_loop.start(0.0);
        game_loop.stop();

        assert!(!game_loop.is_running());
        assert_eq!(game_loop.scheduler().cancelled, vec![1]);
        assert!(!game_loop.scheduler().has_pending());

        game_loop.on_animation_frame(1.0);
        assert!(fixed.borrow().is_empty());
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut game_loop, fixed, _) = counting_loop(64.0);
        game_loop.start(0.0);
        game_loop.stop();
        game_loop.start(5.0);
        // Time spent stopped is not accumulated
        game_loop.on_animation_frame(5.0 + 1.0 / 64.0);
        assert_eq!(fixed.borrow().len(), 1);
    }
}
