//! Discrete trial engine: windowed majority vote over a token stream
//!
//! One trial:
//! - open a capture window of `window_ms`
//! - poll the read function every `POLL_INTERVAL_MS` until the window
//!   closes or `k_samples` valid tokens were captured
//! - classify by majority vote; REST when nothing valid arrived
//!
//! Tie-break: the first token to reach the maximum count wins.

use std::time::Duration;
use tracing::debug;

use crate::core::clock::{Clock, MonotonicClock};
use crate::types::{Sample, Token, TrialResult};
use crate::{DEFAULT_COUNTDOWN_MS, DEFAULT_K_SAMPLES, DEFAULT_WINDOW_MS, POLL_INTERVAL_MS};

/// Windowed voting classifier
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteTrialEngine {
    /// Pre-trial countdown the driver shows; never affects sampling
    pub countdown_ms: u64,
    /// Capture window length
    pub window_ms: u64,
    /// Stop early after this many valid samples
    pub k_samples: usize,
}

impl Default for DiscreteTrialEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_MS, DEFAULT_WINDOW_MS, DEFAULT_K_SAMPLES)
    }
}

impl DiscreteTrialEngine {
    /// Create engine. Caller guarantees `window_ms > 0` and `k_samples > 0`.
    pub fn new(countdown_ms: u64, window_ms: u64, k_samples: usize) -> Self {
        Self {
            countdown_ms,
            window_ms,
            k_samples,
        }
    }

    /// Whole seconds of countdown the driver should display
    pub fn countdown_secs(&self) -> u64 {
        self.countdown_ms / 1000
    }

    /// Run one trial against the process clock. Blocks for up to `window_ms`.
    pub fn run_trial<F>(&self, read_fn: F) -> TrialResult
    where
        F: FnMut() -> Option<Sample>,
    {
        self.run_trial_with_clock(&MonotonicClock, read_fn)
    }

    /// Run one trial against an explicit clock
    pub fn run_trial_with_clock<C, F>(&self, clock: &C, mut read_fn: F) -> TrialResult
    where
        C: Clock + ?Sized,
        F: FnMut() -> Option<Sample>,
    {
        let start = clock.now();
        let deadline = start + self.window_ms as f64 / 1000.0;
        let poll = Duration::from_millis(POLL_INTERVAL_MS);
        let mut samples: Vec<Sample> = Vec::with_capacity(self.k_samples);
        let mut polls: u64 = 0;

        while clock.now() < deadline && samples.len() < self.k_samples {
            polls += 1;
            if let Some(sample) = read_fn() {
                if sample.token.is_valid() {
                    samples.push(sample);
                }
            }
            clock.sleep(poll);
        }

        let decision_time = clock.now();
        let result = decide(&samples, decision_time, self.window_ms);

        debug!(
            prediction = %result.prediction,
            confidence = result.confidence,
            n_samples = result.n_samples,
            polls,
            elapsed_ms = (decision_time - start) * 1000.0,
            "discrete trial decided"
        );

        result
    }
}

/// Classify captured samples, in capture order. Pure: the decision time is
/// passed in. REST samples are skipped; none valid gives the REST result.
pub fn decide(samples: &[Sample], decision_time: f64, window_ms: u64) -> TrialResult {
    let valid: Vec<&Sample> = samples.iter().filter(|s| s.token.is_valid()).collect();
    let (first, last) = match (valid.first(), valid.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return TrialResult::rest(window_ms),
    };

    let (prediction, votes) = majority(valid.iter().map(|s| s.token));
    let total = valid.len();

    TrialResult {
        prediction,
        confidence: votes as f64 / total as f64,
        latency_first_ms: (decision_time - first.timestamp) * 1000.0,
        latency_last_ms: (decision_time - last.timestamp) * 1000.0,
        n_samples: total,
        window_ms,
    }
}

/// Majority vote; the leader only changes on a strictly higher count,
/// so the first token to reach the final maximum wins ties.
fn majority(tokens: impl Iterator<Item = Token>) -> (Token, usize) {
    let mut counts = [0usize; 3];
    let mut leader = (Token::Rest, 0usize);

    for token in tokens {
        let Some(idx) = token.index() else { continue };
        counts[idx] += 1;
        if counts[idx] > leader.1 {
            leader = (token, counts[idx]);
        }
    }

    leader
}
