//! Stoppable frame clock.
//!
//! Stopping the clock freezes it; starting again re-bases the reference time,
//! so the paused interval never shows up as a frame delta.

/// Monotonic millisecond time source.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Wall-clock source backed by `instant::Instant` (performance.now on the web).
pub struct InstantSource {
    origin: instant::Instant,
}

impl InstantSource {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for InstantSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for InstantSource {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

pub struct Clock<T: TimeSource = InstantSource> {
    source: T,
    old_time: f64,
    running: bool,
}

impl<T: TimeSource> Clock<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            old_time: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.old_time = self.source.now_ms();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Seconds since the previous call (or since `start`). Zero while stopped.
    pub fn delta(&mut self) -> f32 {
        if !self.running {
            return 0.0;
        }
        let now = self.source.now_ms();
        let diff = (now - self.old_time) / 1000.0;
        self.old_time = now;
        diff.max(0.0) as f32
    }
}

/// One frame's timing as handed to render hooks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeSample {
    /// Seconds of active (unpaused) time accumulated so far.
    pub elapsed: f32,
    pub delta: f32,
}

/// Clock plus an elapsed accumulator that survives pauses.
pub struct FrameClock<T: TimeSource = InstantSource> {
    clock: Clock<T>,
    elapsed: f32,
}

impl<T: TimeSource> FrameClock<T> {
    pub fn new(source: T) -> Self {
        Self {
            clock: Clock::new(source),
            elapsed: 0.0,
        }
    }

    pub fn resume(&mut self) {
        self.clock.start();
    }

    pub fn pause(&mut self) {
        self.clock.stop();
    }

    pub fn tick(&mut self) -> TimeSample {
        let delta = self.clock.delta();
        self.elapsed += delta;
        TimeSample {
            elapsed: self.elapsed,
            delta,
        }
    }
}
