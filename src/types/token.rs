//! Gesture tokens and captured samples

use serde::{Deserialize, Serialize};

/// A discrete gesture symbol, or the REST sentinel for "no gesture"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Token {
    Rock,
    Paper,
    Scissors,
    /// No valid token (idle classification)
    Rest,
}

impl Token {
    /// The three tokens that count as votes, in canonical order
    pub const VALID: [Token; 3] = [Token::Rock, Token::Paper, Token::Scissors];

    /// Is this one of ROCK / PAPER / SCISSORS?
    pub fn is_valid(&self) -> bool {
        !matches!(self, Token::Rest)
    }

    /// Slot in a per-token vote table (None for REST)
    pub fn index(&self) -> Option<usize> {
        match self {
            Token::Rock => Some(0),
            Token::Paper => Some(1),
            Token::Scissors => Some(2),
            Token::Rest => None,
        }
    }

    /// Map a keyboard character to a token (r / p / s, case-insensitive)
    pub fn from_key(c: char) -> Option<Token> {
        match c.to_ascii_lowercase() {
            'r' => Some(Token::Rock),
            'p' => Some(Token::Paper),
            's' => Some(Token::Scissors),
            _ => None,
        }
    }

    /// The token this one defeats (None for REST)
    pub fn beats(&self) -> Option<Token> {
        match self {
            Token::Rock => Some(Token::Scissors),
            Token::Scissors => Some(Token::Paper),
            Token::Paper => Some(Token::Rock),
            Token::Rest => None,
        }
    }

    /// Get emoji for token
    pub fn emoji(&self) -> &'static str {
        match self {
            Token::Rock => "✊",
            Token::Paper => "✋",
            Token::Scissors => "✌",
            Token::Rest => "·",
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Token::Rock => "ROCK",
            Token::Paper => "PAPER",
            Token::Scissors => "SCISSORS",
            Token::Rest => "REST",
        };
        // pad() so width specifiers like {:<9} work
        f.pad(name)
    }
}

/// One polled input: a token stamped with monotonic seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub token: Token,
    pub timestamp: f64,
}

impl Sample {
    pub fn new(token: Token, timestamp: f64) -> Self {
        Self { token, timestamp }
    }
}
