//! Real-time pacing
//!
//! Turns wall-clock frame deltas into a number of fixed-length ticks.

use std::time::{Duration, Instant};

use crate::config::SimulationConfig;

/// Fixed-step accumulator. Leftover time carries over to the next frame;
/// time beyond the per-frame cap is dropped.
#[derive(Debug, Clone)]
pub struct TickPacer {
    step: Duration,
    accumulator: Duration,
    max_ticks_per_frame: u32,
    last_frame: Option<Instant>,
}

impl TickPacer {
    pub fn new(tick_rate_hz: f64, max_ticks_per_frame: u32) -> Self {
        let step = if tick_rate_hz.is_finite() && tick_rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / tick_rate_hz)
        } else {
            Duration::from_secs_f64(1.0 / 60.0)
        };
        Self {
            step,
            accumulator: Duration::ZERO,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            last_frame: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.tick_rate_hz, config.max_ticks_per_frame)
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Feed `delta` of elapsed time and return how many ticks are due.
    pub fn ticks_due(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;
        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_ticks_per_frame {
            self.accumulator -= self.step;
            due += 1;
        }
        if due == self.max_ticks_per_frame && self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }
        due
    }

    /// Like [`TickPacer::ticks_due`] with the delta measured since the last call.
    pub fn frame(&mut self) -> u32 {
        let now = Instant::now();
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_frame = Some(now);
        self.ticks_due(delta)
    }

    /// Time left until the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.step.saturating_sub(self.accumulator)
    }
}

impl Default for TickPacer {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
