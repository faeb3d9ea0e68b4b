//! Target waveform generator

use std::f64::consts::PI;

use crate::types::{TargetKind, TrackerConfig};

/// Staircase level multipliers (scaled by amplitude)
pub const STEP_LEVELS: [f64; 8] = [-1.0, -0.5, 0.0, 0.5, 1.0, 0.5, 0.0, -0.5];

/// Clamp to the analog range [-1, 1]
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Target value at elapsed time `t` (seconds)
pub fn target_value(cfg: &TrackerConfig, t: f64) -> f64 {
    match cfg.target_kind {
        TargetKind::Sine => sine(cfg.target_amplitude, cfg.target_freq_hz, cfg.target_phase, t),
        TargetKind::Steps => steps(cfg.target_amplitude, cfg.target_freq_hz, t),
    }
}

/// `A·sin(2πft + φ)`, clamped
pub fn sine(amplitude: f64, freq_hz: f64, phase: f64, t: f64) -> f64 {
    clamp_unit(amplitude * (2.0 * PI * freq_hz * t + phase).sin())
}

/// Hold each level for `0.5 / f` seconds, cycling through [`STEP_LEVELS`]
pub fn steps(amplitude: f64, freq_hz: f64, t: f64) -> f64 {
    let segment_s = step_segment_s(freq_hz);
    let idx = (t.max(0.0) / segment_s).floor() as usize % STEP_LEVELS.len();
    clamp_unit(STEP_LEVELS[idx] * amplitude)
}

/// Hold time of one staircase level
pub fn step_segment_s(freq_hz: f64) -> f64 {
    0.5 / freq_hz
}
