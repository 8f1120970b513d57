//! Synthetic upload progress.
//!
//! This is an estimate for display only. It is NOT wired to transferred bytes: it
//! climbs by a fixed step on every tick, stays capped below 100 while the request is
//! in flight, jumps to 100 when the request resolves, and reads as 0 again once the
//! reset delay has elapsed.
use std::time::Duration;

use tokio::time::Instant;

use docqa_core::config::UploadSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Estimate {
    Idle,
    Climbing(u8),
    Complete { at: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticProgress {
    estimate: Estimate,
    step: u8,
    cap: u8,
    reset_after: Duration,
}

impl SyntheticProgress {
    pub fn new(step: u8, cap: u8, reset_after: Duration) -> Self {
        Self { estimate: Estimate::Idle, step, cap: cap.min(99), reset_after }
    }

    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self::new(settings.step, settings.cap, Duration::from_millis(settings.reset_ms))
    }

    pub fn start(&mut self) {
        self.estimate = Estimate::Climbing(0);
    }

    /// Advance one step. Has no effect unless a transfer is in flight.
    pub fn tick(&mut self) {
        if let Estimate::Climbing(p) = self.estimate {
            self.estimate = Estimate::Climbing(p.saturating_add(self.step).min(self.cap));
        }
    }

    pub fn finish(&mut self, now: Instant) {
        self.estimate = Estimate::Complete { at: now };
    }

    pub fn abort(&mut self) {
        self.estimate = Estimate::Idle;
    }

    pub fn percent(&self, now: Instant) -> u8 {
        match self.estimate {
            Estimate::Idle => 0,
            Estimate::Climbing(p) => p,
            Estimate::Complete { at } if now.saturating_duration_since(at) < self.reset_after => 100,
            Estimate::Complete { .. } => 0,
        }
    }
}
