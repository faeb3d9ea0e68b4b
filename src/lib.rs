//! Sonogest: keyboard-proxy trial harness for ultrasound gesture control
//!
//! Two trial engines sit at the core:
//! - discrete: windowed majority vote over a token stream (Rock-Paper-Scissors)
//! - continuous: target generator + user integrator + tracking metrics
//!
//! The CLI in `main.rs` is only a driver; nothing in the library renders.

pub mod config;
pub mod core;
pub mod telemetry;
pub mod types;

// =============================================================================
// DISCRETE TRIAL DEFAULTS
// =============================================================================

/// Confidence reported for an idle (REST) classification
pub const REST_CONFIDENCE: f64 = 0.25;

/// Sleep between two polls of the input source (milliseconds)
pub const POLL_INTERVAL_MS: u64 = 1;

/// Default pre-trial countdown (milliseconds)
pub const DEFAULT_COUNTDOWN_MS: u64 = 3000;

/// Default capture window (milliseconds)
pub const DEFAULT_WINDOW_MS: u64 = 2000;

/// Default sample cap per capture window
pub const DEFAULT_K_SAMPLES: usize = 5;

// =============================================================================
// TRACKER DEFAULTS
// =============================================================================

/// Standard deviation below which a series counts as constant
pub const VARIANCE_EPSILON: f64 = 1e-12;

/// Minimum number of ticks before metrics are computed
pub const MIN_METRIC_SAMPLES: usize = 3;

/// Floor for tick rate when deriving the fallback sample period
pub const MIN_TICK_HZ: f64 = 1e-6;

/// Upper bound on tracker buffer slots reserved before the first tick
pub const MAX_PREALLOC_TICKS: usize = 1 << 16;

// =============================================================================
// ERRORS
// =============================================================================

/// Result type alias for sonogest
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the ambient layers (config, terminal, driver tasks).
/// The engines themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.3.0";
