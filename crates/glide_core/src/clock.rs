//! Frame clocks
//!
//! The tween engine never reads the wall clock itself. Each update is handed a
//! [`FrameClock`] describing the frame being processed: elapsed time scaled by
//! the host's time scale, the raw elapsed time, and a monotonically
//! increasing frame index.

use std::time::Instant;

/// Source of per-frame timing
pub trait FrameClock {
    /// Seconds elapsed this frame, after time scaling
    fn delta(&self) -> f32;

    /// Seconds elapsed this frame, ignoring time scaling
    fn unscaled_delta(&self) -> f32;

    /// Index of the current frame; strictly increases between updates
    fn frame(&self) -> u64;
}

/// Clock advanced by hand, for headless harnesses and tests
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManualClock {
    delta: f32,
    unscaled_delta: f32,
    time_scale: f32,
    frame: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            delta: 0.0,
            unscaled_delta: 0.0,
            time_scale: 1.0,
            frame: 0,
        }
    }

    /// Scale applied to the scaled delta of subsequent frames
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Start a new frame of `dt` unscaled seconds
    pub fn advance(&mut self, dt: f32) -> &Self {
        self.unscaled_delta = dt;
        self.delta = dt * self.time_scale;
        self.frame += 1;
        self
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for ManualClock {
    fn delta(&self) -> f32 {
        self.delta
    }

    fn unscaled_delta(&self) -> f32 {
        self.unscaled_delta
    }

    fn frame(&self) -> u64 {
        self.frame
    }
}

/// Wall-clock timing for live update loops
#[derive(Clone, Debug)]
pub struct SystemClock {
    last_frame: Instant,
    delta: f32,
    unscaled_delta: f32,
    time_scale: f32,
    /// Upper bound on a single frame's delta, to avoid huge jumps after stalls
    max_delta: f32,
    frame: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: 0.0,
            unscaled_delta: 0.0,
            time_scale: 1.0,
            max_delta: 0.25,
            frame: 0,
        }
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta;
    }

    /// Measure the time since the previous call and start a new frame
    pub fn tick(&mut self) -> &Self {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(self.max_delta);
        self.last_frame = now;
        self.unscaled_delta = dt;
        self.delta = dt * self.time_scale;
        self.frame += 1;
        self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn delta(&self) -> f32 {
        self.delta
    }

    fn unscaled_delta(&self) -> f32 {
        self.unscaled_delta
    }

    fn frame(&self) -> u64 {
        self.frame
    }
}
