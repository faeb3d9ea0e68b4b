//! Tracking accuracy metrics: RMSE, Pearson r, cross-correlation lag
//!
//! Lag convention: `c[k] = Σ y0[i+k]·x0[i]` with x = target, y = user.
//! Shift k ranges over `-(n-1)..=n-1`; k = 0 is zero lag and a positive
//! k means the user trails the target.

use crate::types::TrackerMetrics;
use crate::{MIN_METRIC_SAMPLES, MIN_TICK_HZ, VARIANCE_EPSILON};

/// Compute all metrics from equal-length buffers.
///
/// Fewer than 3 samples yields a degenerate record.
pub fn compute(times: &[f64], target: &[f64], user: &[f64], tick_hz: f64) -> TrackerMetrics {
    let n = times.len().min(target.len()).min(user.len());
    let duration_s = times.last().copied().unwrap_or(0.0);

    if n < MIN_METRIC_SAMPLES {
        return TrackerMetrics::degenerate(n, duration_s);
    }

    let (x, y) = (&target[..n], &user[..n]);
    let dt = mean_period(&times[..n]).unwrap_or(1.0 / tick_hz.max(MIN_TICK_HZ));
    let k_best = best_lag(x, y);

    TrackerMetrics {
        rmse: rmse(x, y),
        r: pearson(x, y),
        lag_ms: k_best as f64 * dt * 1000.0,
        rmse_best_lag: rmse_with_lag(x, y, k_best),
        n,
        duration_s,
    }
}

pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Population standard deviation
pub fn std_dev(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let m = mean(v);
    (v.iter().map(|a| (a - m).powi(2)).sum::<f64>() / v.len() as f64).sqrt()
}

/// Root-mean-square of `y - x`; 0 for empty input
pub fn rmse(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let sq: f64 = x.iter().zip(y).map(|(a, b)| (b - a).powi(2)).sum();
    (sq / n as f64).sqrt()
}

/// Pearson correlation; 0 when either side is (near) constant
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (sx, sy) = (std_dev(x), std_dev(y));
    if sx < VARIANCE_EPSILON || sy < VARIANCE_EPSILON {
        return 0.0;
    }
    let (mx, my) = (mean(x), mean(y));
    let cov = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / n as f64;
    (cov / (sx * sy)).clamp(-1.0, 1.0)
}

/// Mean of consecutive differences; None with fewer than 2 samples
pub fn mean_period(times: &[f64]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let span: f64 = times.windows(2).map(|w| w[1] - w[0]).sum();
    Some(span / (times.len() - 1) as f64)
}

/// Full cross-correlation of mean-centred `y` against mean-centred `x`.
///
/// Index `i` of the result corresponds to shift `i - (n-1)`.
pub fn cross_correlation(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n == 0 {
        return Vec::new();
    }
    let (mx, my) = (mean(&x[..n]), mean(&y[..n]));
    let x0: Vec<f64> = x[..n].iter().map(|a| a - mx).collect();
    let y0: Vec<f64> = y[..n].iter().map(|b| b - my).collect();

    let n_i = n as isize;
    (-(n_i - 1)..n_i)
        .map(|k| {
            // overlap of i in [0, n) with i + k in [0, n)
            let lo = 0.max(-k);
            let hi = n_i.min(n_i - k);
            (lo..hi)
                .map(|i| y0[(i + k) as usize] * x0[i as usize])
                .sum()
        })
        .collect()
}

/// Shift maximising the cross-correlation; ties go to the most negative shift.
/// A (near) constant series has no alignment, so the lag is 0 rather than the
/// first index of an all-zero correlation (which would read as `-(n-1)`).
pub fn best_lag(x: &[f64], y: &[f64]) -> isize {
    if std_dev(x) < VARIANCE_EPSILON || std_dev(y) < VARIANCE_EPSILON {
        return 0;
    }
    let corr = cross_correlation(x, y);
    if corr.is_empty() {
        return 0;
    }
    let n = (corr.len() + 1) / 2;
    let mut best = 0usize;
    for (i, c) in corr.iter().enumerate() {
        if *c > corr[best] {
            best = i;
        }
    }
    best as isize - (n as isize - 1)
}

/// RMSE after shifting `y` by `k` samples relative to `x`.
/// The non-overlapping edge is trimmed; an empty overlap gives 0.
pub fn rmse_with_lag(x: &[f64], y: &[f64], k: isize) -> f64 {
    let n = x.len().min(y.len());
    let shift = k.unsigned_abs();
    if shift >= n {
        return 0.0;
    }
    let (seg_x, seg_y) = if k >= 0 {
        (&x[..n - shift], &y[shift..n])
    } else {
        (&x[shift..n], &y[..n - shift])
    };
    rmse(seg_x, seg_y)
}
