//! Core types for sonogest

mod token;
mod trial;
mod tracker;

pub use token::{Token, Sample};
pub use trial::{TrialResult, Outcome, RoundRecord};
pub use tracker::{TargetKind, TrackerConfig, TickSample, TrackerMetrics};
