//! Analog stand-ins for the continuous channel
//!
//! `AnalogProxy` integrates discrete key nudges into a value in [-1, 1].
//! `SimulatedFollower` replays the target with a fixed delay, for headless
//! runs and tests.

use std::collections::VecDeque;

use crate::core::target::clamp_unit;

/// Keyboard-to-analog integrator
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogProxy {
    value: f64,
    step: f64,
}

impl AnalogProxy {
    pub fn new(step: f64) -> Self {
        Self {
            value: 0.0,
            step: step.abs(),
        }
    }

    /// Move by `direction` steps (positive = up)
    pub fn nudge(&mut self, direction: i32) -> f64 {
        self.value = clamp_unit(self.value + direction as f64 * self.step);
        self.value
    }

    pub fn recenter(&mut self) {
        self.value = 0.0;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Operator model: outputs the target seen `delay_s` ago
#[derive(Debug, Clone)]
pub struct SimulatedFollower {
    delay_s: f64,
    history: VecDeque<(f64, f64)>,
}

impl SimulatedFollower {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_s: delay_ms.max(0.0) / 1000.0,
            history: VecDeque::new(),
        }
    }

    /// Observe the target at elapsed time `t` and answer with the newest
    /// target value at or before `t - delay`. Before any such value exists
    /// the follower rests at 0.
    pub fn respond(&mut self, t: f64, target: f64) -> f64 {
        self.history.push_back((t, target));
        let cutoff = t - self.delay_s + 1e-9;

        // keep only one entry at or before the cutoff
        while self.history.len() >= 2 && self.history[1].0 <= cutoff {
            self.history.pop_front();
        }

        match self.history.front() {
            Some((ts, v)) if *ts <= cutoff => *v,
            _ => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
