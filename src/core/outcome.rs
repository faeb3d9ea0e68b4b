//! Outcome resolver for the Rock-Paper-Scissors game

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Outcome, Token};

/// Decide the round from the user's perspective.
/// An invalid user token (REST) always loses.
pub fn resolve(user: Token, opponent: Token) -> Outcome {
    match user.beats() {
        None => Outcome::Lose,
        Some(_) if user == opponent => Outcome::Tie,
        Some(beaten) if beaten == opponent => Outcome::Win,
        Some(_) => Outcome::Lose,
    }
}

/// Uniformly random opponent choice
pub fn pick_opponent<R: Rng + ?Sized>(rng: &mut R) -> Token {
    *Token::VALID.choose(rng).unwrap_or(&Token::Rock)
}
