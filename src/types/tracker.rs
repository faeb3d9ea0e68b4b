//! Continuous tracking configuration and records

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::MAX_PREALLOC_TICKS;

/// Target waveform shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Sine,
    Steps,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Sine => f.pad("sine"),
            TargetKind::Steps => f.pad("steps"),
        }
    }
}

impl std::str::FromStr for TargetKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(TargetKind::Sine),
            "steps" => Ok(TargetKind::Steps),
            other => Err(crate::Error::Config(format!(
                "target kind must be 'sine' or 'steps', got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for one continuous trial.
///
/// Values are trusted by the engine; run [`TrackerConfig::validate`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Trial length (seconds)
    pub duration_s: f64,
    /// Driver tick rate (Hz); the engine only uses it for the dt fallback
    pub tick_hz: f64,
    pub target_kind: TargetKind,
    pub target_freq_hz: f64,
    pub target_amplitude: f64,
    /// Phase offset (radians)
    pub target_phase: f64,
    /// Apply exponential smoothing to the user signal
    pub stabilize_user: bool,
    /// Smoothing factor in (0, 1]; 1.0 disables smoothing in effect
    pub stabilize_alpha: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            duration_s: 15.0,
            tick_hz: 50.0,
            target_kind: TargetKind::Sine,
            target_freq_hz: 0.3,
            target_amplitude: 0.9,
            target_phase: 0.0,
            stabilize_user: false,
            stabilize_alpha: 0.15,
        }
    }
}

impl TrackerConfig {
    /// Check every field is inside its documented domain
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.duration_s > 0.0 && self.duration_s.is_finite()) {
            return Err(crate::Error::Config(format!(
                "duration_s must be > 0, got {}",
                self.duration_s
            )));
        }
        if !(self.tick_hz > 0.0 && self.tick_hz.is_finite()) {
            return Err(crate::Error::Config(format!(
                "tick_hz must be > 0, got {}",
                self.tick_hz
            )));
        }
        if !(self.target_freq_hz > 0.0 && self.target_freq_hz.is_finite()) {
            return Err(crate::Error::Config(format!(
                "target_freq_hz must be > 0, got {}",
                self.target_freq_hz
            )));
        }
        if !(self.target_amplitude > 0.0 && self.target_amplitude <= 1.0) {
            return Err(crate::Error::Config(format!(
                "target_amplitude must be in (0, 1], got {}",
                self.target_amplitude
            )));
        }
        if !self.target_phase.is_finite() {
            return Err(crate::Error::Config("target_phase must be finite".to_string()));
        }
        if !(self.stabilize_alpha > 0.0 && self.stabilize_alpha <= 1.0) {
            return Err(crate::Error::Config(format!(
                "stabilize_alpha must be in (0, 1], got {}",
                self.stabilize_alpha
            )));
        }
        Ok(())
    }

    /// Expected number of ticks for a full trial (saturates for huge trials)
    pub fn expected_ticks(&self) -> usize {
        ((self.duration_s * self.tick_hz).ceil() as usize).saturating_add(1)
    }

    /// Buffer capacity to reserve up front; long trials grow on demand
    pub fn buffer_capacity(&self) -> usize {
        self.expected_ticks().min(MAX_PREALLOC_TICKS)
    }

    /// Interval between driver ticks; must be non-zero and representable
    pub fn tick_period(&self) -> crate::Result<Duration> {
        match Duration::try_from_secs_f64(1.0 / self.tick_hz) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(crate::Error::Config(format!(
                "tick_hz {} gives no usable tick period",
                self.tick_hz
            ))),
        }
    }
}

/// One recorded tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickSample {
    /// Elapsed trial time (seconds)
    pub t: f64,
    pub target: f64,
    pub user: f64,
}

/// Post-hoc accuracy of one tracking trial
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerMetrics {
    pub rmse: f64,
    /// Pearson correlation (target vs user)
    pub r: f64,
    /// Best alignment shift; positive = user trails target
    pub lag_ms: f64,
    pub rmse_best_lag: f64,
    pub n: usize,
    pub duration_s: f64,
}

impl TrackerMetrics {
    /// Degenerate record for buffers too short to analyse
    pub fn degenerate(n: usize, duration_s: f64) -> Self {
        Self {
            n,
            duration_s,
            ..Self::default()
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "rmse={:.4} | r={:.3} | lag={:.1}ms | rmse@lag={:.4} | n={} | duration={:.2}s",
            self.rmse, self.r, self.lag_ms, self.rmse_best_lag, self.n, self.duration_s
        )
    }
}
