//! Session scoreboard: a pure fold over played rounds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Outcome, TrialResult};

/// Running totals for one RPS session, owned by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub started_at: DateTime<Utc>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub trials: u32,
    pub sum_confidence: f64,
    pub sum_n_samples: usize,
    pub sum_latency_first_ms: f64,
    pub sum_latency_last_ms: f64,
}

/// Averages across a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trials: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub avg_confidence: f64,
    pub avg_n_samples: f64,
    pub avg_latency_first_ms: f64,
    pub avg_latency_last_ms: f64,
    pub session_secs: i64,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            wins: 0,
            losses: 0,
            ties: 0,
            trials: 0,
            sum_confidence: 0.0,
            sum_n_samples: 0,
            sum_latency_first_ms: 0.0,
            sum_latency_last_ms: 0.0,
        }
    }

    /// Fold one round into the totals
    pub fn fold(self, result: &TrialResult, outcome: Outcome) -> Self {
        let (wins, losses, ties) = match outcome {
            Outcome::Win => (self.wins + 1, self.losses, self.ties),
            Outcome::Lose => (self.wins, self.losses + 1, self.ties),
            Outcome::Tie => (self.wins, self.losses, self.ties + 1),
        };
        Self {
            wins,
            losses,
            ties,
            trials: self.trials + 1,
            sum_confidence: self.sum_confidence + result.confidence,
            sum_n_samples: self.sum_n_samples + result.n_samples,
            sum_latency_first_ms: self.sum_latency_first_ms + result.latency_first_ms,
            sum_latency_last_ms: self.sum_latency_last_ms + result.latency_last_ms,
            ..self
        }
    }

    /// "Wins: 1  Losses: 0  Ties: 2"
    pub fn score_line(&self) -> String {
        format!("Wins: {}  Losses: {}  Ties: {}", self.wins, self.losses, self.ties)
    }

    /// Session averages; None before the first round
    pub fn summary(&self) -> Option<Summary> {
        if self.trials == 0 {
            return None;
        }
        let n = self.trials as f64;
        Some(Summary {
            trials: self.trials,
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            avg_confidence: self.sum_confidence / n,
            avg_n_samples: self.sum_n_samples as f64 / n,
            avg_latency_first_ms: self.sum_latency_first_ms / n,
            avg_latency_last_ms: self.sum_latency_last_ms / n,
            session_secs: (Utc::now() - self.started_at).num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Token;

    fn result(confidence: f64, n: usize, lat: f64) -> TrialResult {
        TrialResult {
            prediction: Token::Rock,
            confidence,
            latency_first_ms: lat * 2.0,
            latency_last_ms: lat,
            n_samples: n,
            window_ms: 2000,
        }
    }

    #[test]
    fn test_empty_has_no_summary() {
        assert!(Scoreboard::new().summary().is_none());
    }

    #[test]
    fn test_fold_counts_outcomes() {
        let board = Scoreboard::new()
            .fold(&result(1.0, 3, 10.0), Outcome::Win)
            .fold(&result(0.5, 2, 20.0), Outcome::Lose)
            .fold(&TrialResult::rest(2000), Outcome::Lose)
            .fold(&result(1.0, 1, 30.0), Outcome::Tie);

        assert_eq!((board.wins, board.losses, board.ties), (1, 2, 1));
        assert_eq!(board.trials, 4);
        assert_eq!(board.score_line(), "Wins: 1  Losses: 2  Ties: 1");
    }

    #[test]
    fn test_summary_averages() {
        let board = Scoreboard::new()
            .fold(&result(1.0, 4, 10.0), Outcome::Win)
            .fold(&result(0.5, 2, 30.0), Outcome::Tie);
        let s = board.summary().unwrap();
        assert_eq!(s.trials, 2);
        assert!((s.avg_confidence - 0.75).abs() < 1e-12);
        assert!((s.avg_n_samples - 3.0).abs() < 1e-12);
        assert!((s.avg_latency_last_ms - 20.0).abs() < 1e-12);
        assert!((s.avg_latency_first_ms - 40.0).abs() < 1e-12);
    }
}
