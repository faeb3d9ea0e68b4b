//! Integration tests for Slice 2 - Continuous tracker
//!
//! Tests the full path: tick loop → ContinuousTrackerEngine → metrics

use sonogest::core::target::target_value;
use sonogest::core::{ContinuousTrackerEngine, SimulatedFollower};
use sonogest::types::{TargetKind, TickSample, TrackerConfig};
use std::f64::consts::PI;

fn config(kind: TargetKind, duration_s: f64, freq: f64, amplitude: f64) -> TrackerConfig {
    TrackerConfig {
        duration_s,
        tick_hz: 50.0,
        target_kind: kind,
        target_freq_hz: freq,
        target_amplitude: amplitude,
        target_phase: 0.0,
        stabilize_user: false,
        stabilize_alpha: 0.15,
    }
}

/// Drive a full trial at tick_hz with `user_fn(elapsed, target)`; returns ticks taken
fn drive<F>(engine: &mut ContinuousTrackerEngine, mut user_fn: F) -> usize
where
    F: FnMut(f64, f64) -> f64,
{
    let cfg = engine.config().clone();
    // engine time equals `elapsed` exactly
    let t0 = 0.0;
    engine.start_at(t0);
    let mut ticks = 0;
    let mut i = 0u32;
    while engine.is_running() {
        let elapsed = i as f64 / cfg.tick_hz;
        let user = user_fn(elapsed, target_value(&cfg, elapsed));
        engine.step(t0 + elapsed, user);
        ticks += 1;
        i += 1;
    }
    ticks
}

#[test]
fn test_full_trial_buffers() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Sine, 2.0, 0.3, 0.9));
    let ticks = drive(&mut engine, |_, _| 0.2);

    assert_eq!(engine.times().len(), ticks);
    assert_eq!(engine.target_values().len(), ticks);
    assert_eq!(engine.user_values().len(), ticks);
    assert!(engine.elapsed() >= 2.0);
    assert!(engine.finished());
    assert!(!engine.is_running());
    assert!(engine.times().windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_idle_step_is_inert() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Sine, 1.0, 0.3, 0.9));
    assert_eq!(engine.step(5.0, 0.7), TickSample { t: 0.0, target: 0.0, user: 0.0 });
    assert!(engine.is_empty());

    // finished trials are idle too; buffers stay put
    drive(&mut engine, |_, target| target);
    let n = engine.len();
    assert_eq!(engine.step(500.0, 0.7), TickSample::default());
    assert_eq!(engine.len(), n);
}

#[test]
fn test_perfect_tracking_metrics() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Sine, 3.0, 0.5, 0.9));
    drive(&mut engine, |_, target| target);
    let m = engine.compute_metrics();

    assert!(m.rmse < 1e-12);
    assert!((m.r - 1.0).abs() < 1e-9);
    assert_eq!(m.lag_ms, 0.0);
    assert!(m.rmse_best_lag < 1e-12);
    assert_eq!(m.n, engine.len());
}

#[test]
fn test_constant_user_has_zero_correlation() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Steps, 2.0, 1.0, 0.8));
    drive(&mut engine, |_, _| 0.0);
    let m = engine.compute_metrics();

    assert_eq!(m.r, 0.0);
    assert!(m.r.is_finite());
    assert!(m.rmse > 0.0);
}

/// User held at 0 against a 0.25 Hz unit sine for 2 s: half a period,
/// so the RMS error is 1/√2
#[test]
fn test_rmse_matches_closed_form() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Sine, 2.0, 0.25, 1.0));
    drive(&mut engine, |_, _| 0.0);
    let m = engine.compute_metrics();

    // ∫₀² sin²(πt/2) dt / 2 = 1/2
    let closed_form = (0.5f64).sqrt();
    assert!((m.rmse - closed_form).abs() < 0.01, "rmse={}", m.rmse);
    assert_eq!(m.n, 101);
    assert!((m.duration_s - 2.0).abs() < 1e-12);
}

/// A follower 100 ms behind a staircase shows up as +100 ms lag
#[test]
fn test_delayed_follower_lag() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Steps, 20.0, 2.0, 0.8));
    let mut follower = SimulatedFollower::new(100.0);
    drive(&mut engine, |t, target| follower.respond(t, target));
    let m = engine.compute_metrics();

    assert!((m.lag_ms - 100.0).abs() < 1e-6, "lag_ms={}", m.lag_ms);
    assert!(m.rmse_best_lag < 1e-9);
    assert!(m.rmse > m.rmse_best_lag);
    assert!(m.r > 0.5);
}

/// Leading the target gives a negative lag
#[test]
fn test_leading_user_has_negative_lag() {
    let cfg = config(TargetKind::Steps, 20.0, 2.0, 0.8);
    let ahead = cfg.clone();
    let mut engine = ContinuousTrackerEngine::new(cfg);
    drive(&mut engine, |t, _| target_value(&ahead, t + 0.06));
    let m = engine.compute_metrics();

    assert!((m.lag_ms + 60.0).abs() < 1e-6, "lag_ms={}", m.lag_ms);
}

#[test]
fn test_smoothing_reduces_jitter() {
    let mut raw_cfg = config(TargetKind::Sine, 4.0, 0.5, 0.9);
    let jitter = |i: usize| if i % 2 == 0 { 0.3 } else { -0.3 };

    let mut raw = ContinuousTrackerEngine::new(raw_cfg.clone());
    let mut k = 0;
    drive(&mut raw, |_, target| {
        k += 1;
        target + jitter(k)
    });

    raw_cfg.stabilize_user = true;
    raw_cfg.stabilize_alpha = 0.3;
    let mut smooth = ContinuousTrackerEngine::new(raw_cfg);
    let mut k = 0;
    drive(&mut smooth, |_, target| {
        k += 1;
        target + jitter(k)
    });

    let step_var = |v: &[f64]| v.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>();
    assert!(step_var(smooth.user_values()) < step_var(raw.user_values()));
    assert!(smooth.user_values().iter().all(|u| (-1.0..=1.0).contains(u)));
}

#[test]
fn test_sine_reference_points() {
    let cfg = config(TargetKind::Sine, 1.0, 0.4, 0.7);
    assert!(target_value(&cfg, 0.0).abs() < 1e-12);
    assert!((target_value(&cfg, 1.0 / (4.0 * 0.4)) - 0.7).abs() < 1e-12);

    let shifted = TrackerConfig {
        target_phase: PI,
        ..cfg
    };
    assert!((target_value(&shifted, 1.0 / (4.0 * 0.4)) + 0.7).abs() < 1e-12);
}

#[test]
fn test_short_trial_metrics_are_degenerate() {
    let mut engine = ContinuousTrackerEngine::new(config(TargetKind::Sine, 0.02, 0.3, 0.9));
    let ticks = drive(&mut engine, |_, _| 0.5);
    assert_eq!(ticks, 2);

    let m = engine.compute_metrics();
    assert_eq!(m.n, 2);
    assert_eq!(m.rmse, 0.0);
    assert_eq!(m.r, 0.0);
    assert!((m.duration_s - 0.02).abs() < 1e-12);
}
