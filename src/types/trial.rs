//! Discrete trial records

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

use crate::types::Token;
use crate::REST_CONFIDENCE;

/// Result of one discrete capture window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Winning token, or REST when nothing valid was captured
    pub prediction: Token,
    /// Vote share of the winner (0.0-1.0)
    pub confidence: f64,
    /// Decision time minus first sample time (ms)
    pub latency_first_ms: f64,
    /// Decision time minus last sample time (ms)
    pub latency_last_ms: f64,
    /// Valid samples captured
    pub n_samples: usize,
    /// Configured window length (ms)
    pub window_ms: u64,
}

impl TrialResult {
    /// Idle classification: no valid token in the window
    pub fn rest(window_ms: u64) -> Self {
        Self {
            prediction: Token::Rest,
            confidence: REST_CONFIDENCE,
            latency_first_ms: 0.0,
            latency_last_ms: 0.0,
            n_samples: 0,
            window_ms,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.n_samples == 0
    }

    /// Votes cast for the prediction
    pub fn votes(&self) -> usize {
        (self.confidence * self.n_samples as f64).round() as usize
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "prediction={} | confidence={:.2} | latency_last={:.1}ms | latency_first={:.1}ms | n={} | window={}ms",
            self.prediction,
            self.confidence,
            self.latency_last_ms,
            self.latency_first_ms,
            self.n_samples,
            self.window_ms
        )
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let confidence = format!("{:.2}", self.confidence);
        let confidence = if self.confidence >= 0.75 {
            confidence.green()
        } else if self.confidence >= 0.5 {
            confidence.yellow()
        } else {
            confidence.red()
        };
        format!(
            "{} {:<9} confidence={} latency(last)={:.1}ms latency(first)={:.1}ms {}",
            self.prediction.emoji(),
            self.prediction.to_string().bold(),
            confidence,
            self.latency_last_ms,
            self.latency_first_ms,
            format!("(n={}, window={}ms)", self.n_samples, self.window_ms).dimmed()
        )
    }
}

/// Result of one Rock-Paper-Scissors round from the user's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

impl Outcome {
    /// Colored label for terminal display
    pub fn colored(&self) -> ColoredString {
        match self {
            Outcome::Win => self.to_string().green().bold(),
            Outcome::Lose => self.to_string().red().bold(),
            Outcome::Tie => self.to_string().yellow().bold(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Outcome::Win => "WIN",
            Outcome::Lose => "LOSE",
            Outcome::Tie => "TIE",
        };
        f.pad(name)
    }
}

/// One played round: the engine's result plus the opponent and outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub trial: u32,
    pub result: TrialResult,
    pub opponent: Token,
    pub outcome: Outcome,
}
