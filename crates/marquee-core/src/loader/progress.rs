//! Loader progress state
//!
//! Pure state transitions for the counter shown on the loader overlay.
//! Progress never decreases and never exceeds 100.

use crate::config::LoaderConfig;

pub const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    /// Random increments up to the soft ceiling while waiting on the gates
    Simulating,
    /// Both gates satisfied, fixed increments up to 100
    Completing,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderState {
    displayed: f64,
    phase: LoaderPhase,
    soft_ceiling: f64,
    complete_step: f64,
}

impl LoaderState {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            displayed: 0.0,
            phase: LoaderPhase::Simulating,
            soft_ceiling: config.soft_ceiling.clamp(0.0, COMPLETE),
            complete_step: config.complete_step,
        }
    }

    #[inline]
    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    #[inline]
    pub fn phase(&self) -> LoaderPhase {
        self.phase
    }

    /// Apply one simulated tick. Ignored outside `Simulating` or at the soft ceiling.
    pub fn simulate_tick(&mut self, increment: f64) -> bool {
        if self.phase != LoaderPhase::Simulating || self.displayed >= self.soft_ceiling {
            return false;
        }
        if !increment.is_finite() || increment <= 0.0 {
            return false;
        }
        self.displayed = (self.displayed + increment).min(COMPLETE);
        true
    }

    /// Both gates are satisfied
    pub fn begin_completing(&mut self) {
        if self.phase == LoaderPhase::Simulating {
            self.phase = LoaderPhase::Completing;
        }
    }

    /// Apply one completion tick. Returns true once progress reaches 100.
    pub fn complete_tick(&mut self) -> bool {
        match self.phase {
            LoaderPhase::Completing => {
                self.displayed = (self.displayed + self.complete_step).min(COMPLETE);
                if self.displayed >= COMPLETE {
                    self.phase = LoaderPhase::Finished;
                    true
                } else {
                    false
                }
            }
            LoaderPhase::Finished => true,
            LoaderPhase::Simulating => false,
        }
    }

    /// Counter text, e.g. "42%"
    pub fn label(&self) -> String {
        format!("{}%", self.displayed.min(COMPLETE).floor() as u32)
    }

    /// Counter grows with progress
    pub fn scale(&self) -> f64 {
        1.0 + self.displayed / COMPLETE
    }
}
