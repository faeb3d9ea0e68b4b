//! Core modules for sonogest

pub mod clock;
pub mod input;
pub mod keyboard;
pub mod discrete;
pub mod outcome;
pub mod target;
pub mod metrics;
pub mod tracker;
pub mod proxy;
pub mod scoreboard;

pub use clock::{Clock, MonotonicClock, SimulatedClock};
pub use input::{KeyBuffer, KeySender, ScriptedSource};
pub use keyboard::{KeyboardSource, KeyInput};
pub use discrete::{DiscreteTrialEngine, decide};
pub use outcome::{resolve, pick_opponent};
pub use tracker::ContinuousTrackerEngine;
pub use proxy::{AnalogProxy, SimulatedFollower};
pub use scoreboard::{Scoreboard, Summary};
