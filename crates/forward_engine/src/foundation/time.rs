//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing.
///
/// Drivers call [`FrameTimer::update`] once per frame and feed
/// [`FrameTimer::delta_time`] to the scene update.
pub struct FrameTimer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Time since the previous frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total time accumulated by [`FrameTimer::update`]
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames measured
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frame time in milliseconds since creation
    pub fn average_frame_millis(&self) -> f32 {
        if self.frame_count > 0 {
            self.total_time * 1000.0 / self.frame_count as f32
        } else {
            0.0
        }
    }
}

/// Accumulated scene time handed to shaders.
///
/// Resets to zero once it passes `wrap` so single-precision shader maths
/// keeps its resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrappingTimer {
    value: f32,
    wrap: f32,
}

impl WrappingTimer {
    /// Create a timer at zero that wraps past `wrap` seconds
    pub fn new(wrap: f32) -> Self {
        Self { value: 0.0, wrap }
    }

    /// Add one frame's worth of time
    pub fn advance(&mut self, frame_time: f32) -> f32 {
        self.value += frame_time;
        if self.value > self.wrap {
            self.value = 0.0;
        }
        self.value
    }

    /// Current value in seconds
    pub fn value(&self) -> f32 {
        self.value
    }
}
