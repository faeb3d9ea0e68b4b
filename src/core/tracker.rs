//! Continuous tracker engine
//!
//! State machine: Idle → Running → Idle (re-entrant via `start`)
//! - `start`: clear buffers, stamp t0, Running
//! - `step`: append one (t, target, user) tick; crossing `duration_s` ends
//!   the trial on that tick (the tick itself is kept)
//! - buffers stay readable while Idle until the next `start`

use tracing::debug;

use crate::core::clock::MonotonicClock;
use crate::core::metrics;
use crate::core::target::{clamp_unit, target_value};
use crate::types::{TickSample, TrackerConfig, TrackerMetrics};

/// Tracker engine; exclusively owns its configuration and buffers
#[derive(Debug, Clone)]
pub struct ContinuousTrackerEngine {
    cfg: TrackerConfig,
    t0: Option<f64>,
    t_last: Option<f64>,
    running: bool,
    times: Vec<f64>,
    target_vals: Vec<f64>,
    user_vals: Vec<f64>,
    user_smoothed: Option<f64>,
}

impl Default for ContinuousTrackerEngine {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl ContinuousTrackerEngine {
    /// Create engine. `cfg` is trusted; validate it beforehand.
    pub fn new(cfg: TrackerConfig) -> Self {
        let capacity = cfg.buffer_capacity();
        Self {
            cfg,
            t0: None,
            t_last: None,
            running: false,
            times: Vec::with_capacity(capacity),
            target_vals: Vec::with_capacity(capacity),
            user_vals: Vec::with_capacity(capacity),
            user_smoothed: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    /// Start (or restart) a trial now, on the process clock
    pub fn start(&mut self) {
        self.start_at(MonotonicClock::seconds());
    }

    /// Start (or restart) a trial with an explicit start timestamp
    pub fn start_at(&mut self, t0: f64) {
        self.reset_buffers();
        self.t0 = Some(t0);
        self.t_last = None;
        self.running = true;
        self.user_smoothed = None;
        debug!(
            kind = %self.cfg.target_kind,
            duration_s = self.cfg.duration_s,
            freq_hz = self.cfg.target_freq_hz,
            "tracker trial started"
        );
    }

    /// Stop ticking; buffers stay inspectable
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset_buffers(&mut self) {
        self.times.clear();
        self.target_vals.clear();
        self.user_vals.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Has the recorded time reached the configured duration?
    pub fn finished(&self) -> bool {
        self.times
            .last()
            .is_some_and(|t| *t >= self.cfg.duration_s)
    }

    /// Advance one tick. Idle engines return zeros and change nothing.
    pub fn step(&mut self, t_now: f64, user_val: f64) -> TickSample {
        let t0 = match (self.running, self.t0) {
            (true, Some(t0)) => t0,
            _ => return TickSample::default(),
        };

        let t = (t_now - t0).max(0.0);
        let target = target_value(&self.cfg, t);
        let user = clamp_unit(user_val);

        let user_out = if self.cfg.stabilize_user {
            let a = self.cfg.stabilize_alpha;
            let smoothed = match self.user_smoothed {
                None => user,
                Some(prev) => (1.0 - a) * prev + a * user,
            };
            self.user_smoothed = Some(smoothed);
            clamp_unit(smoothed)
        } else {
            user
        };

        self.times.push(t);
        self.target_vals.push(target);
        self.user_vals.push(user_out);
        self.t_last = Some(t_now);

        if t >= self.cfg.duration_s {
            self.running = false;
            debug!(ticks = self.times.len(), elapsed_s = t, "tracker trial finished");
        }

        TickSample {
            t,
            target,
            user: user_out,
        }
    }

    /// Accuracy metrics over everything recorded since the last `start`
    pub fn compute_metrics(&self) -> TrackerMetrics {
        metrics::compute(&self.times, &self.target_vals, &self.user_vals, self.cfg.tick_hz)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn target_values(&self) -> &[f64] {
        &self.target_vals
    }

    pub fn user_values(&self) -> &[f64] {
        &self.user_vals
    }

    /// Caller timestamp of the most recent tick
    pub fn last_tick(&self) -> Option<f64> {
        self.t_last
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Elapsed trial time at the most recent tick
    pub fn elapsed(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;

    fn cfg(duration_s: f64) -> TrackerConfig {
        TrackerConfig {
            duration_s,
            tick_hz: 50.0,
            target_kind: TargetKind::Sine,
            target_freq_hz: 0.25,
            target_amplitude: 1.0,
            target_phase: 0.0,
            stabilize_user: false,
            stabilize_alpha: 0.5,
        }
    }

    #[test]
    fn test_huge_duration_builds_and_runs() {
        let mut engine = ContinuousTrackerEngine::new(cfg(1e18));
        engine.start_at(0.0);
        engine.step(0.02, 0.1);
        engine.step(0.04, 0.2);
        assert!(engine.is_running());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_step_while_idle_is_noop() {
        let mut engine = ContinuousTrackerEngine::new(cfg(1.0));
        assert_eq!(engine.step(3.0, 0.5), TickSample::default());
        assert!(engine.is_empty());
        assert!(engine.last_tick().is_none());
    }

    #[test]
    fn test_step_clamps_user() {
        let mut engine = ContinuousTrackerEngine::new(cfg(1.0));
        engine.start_at(10.0);
        assert_eq!(engine.step(10.1, 4.0).user, 1.0);
        assert_eq!(engine.step(10.2, -4.0).user, -1.0);
    }

    #[test]
    fn test_elapsed_never_negative() {
        let mut engine = ContinuousTrackerEngine::new(cfg(1.0));
        engine.start_at(10.0);
        let tick = engine.step(9.5, 0.0);
        assert_eq!(tick.t, 0.0);
        assert!(tick.target.abs() < 1e-12);
    }

    #[test]
    fn test_trial_ends_on_crossing_tick() {
        let mut engine = ContinuousTrackerEngine::new(cfg(0.1));
        engine.start_at(0.0);
        for i in 1..=4 {
            engine.step(i as f64 * 0.02, 0.0);
        }
        assert!(engine.is_running());
        assert!(!engine.finished());

        let tick = engine.step(0.1, 0.0);
        assert!((tick.t - 0.1).abs() < 1e-12);
        assert!(!engine.is_running());
        assert!(engine.finished());
        assert_eq!(engine.len(), 5);

        // further ticks are ignored
        engine.step(0.12, 0.0);
        assert_eq!(engine.len(), 5);
    }

    #[test]
    fn test_restart_clears_buffers() {
        let mut engine = ContinuousTrackerEngine::new(cfg(0.05));
        engine.start_at(0.0);
        engine.step(0.02, 0.1);
        engine.step(0.06, 0.1);
        assert!(!engine.is_running());
        assert_eq!(engine.len(), 2);

        engine.start_at(1.0);
        assert!(engine.is_running());
        assert!(engine.is_empty());
        assert!(!engine.finished());
    }

    #[test]
    fn test_stop_keeps_buffers() {
        let mut engine = ContinuousTrackerEngine::new(cfg(5.0));
        engine.start_at(0.0);
        engine.step(0.02, 0.3);
        engine.stop();
        assert!(!engine.is_running());
        assert_eq!(engine.user_values(), &[0.3]);
        assert_eq!(engine.step(0.04, 0.3), TickSample::default());
    }

    #[test]
    fn test_smoothing_seeded_with_first_value() {
        let mut c = cfg(5.0);
        c.stabilize_user = true;
        c.stabilize_alpha = 0.5;
        let mut engine = ContinuousTrackerEngine::new(c);
        engine.start_at(0.0);

        assert_eq!(engine.step(0.02, 1.0).user, 1.0);
        assert_eq!(engine.step(0.04, 0.0).user, 0.5);
        assert_eq!(engine.step(0.06, 0.0).user, 0.25);
        // raw input is clamped before filtering
        assert_eq!(engine.step(0.08, 10.0).user, 0.625);
    }

    #[test]
    fn test_smoother_resets_on_start() {
        let mut c = cfg(5.0);
        c.stabilize_user = true;
        let mut engine = ContinuousTrackerEngine::new(c);
        engine.start_at(0.0);
        engine.step(0.02, 1.0);
        engine.start_at(1.0);
        assert_eq!(engine.step(1.02, -0.4).user, -0.4);
    }
}
