//! Physical keyboard adapter (terminal raw mode via crossterm)
//!
//! Keys:
//! - r / p / s  → ROCK / PAPER / SCISSORS
//! - Up / k     → analog up, Down / j → analog down, Space → recentre
//! - q / Esc / Ctrl-C → quit request

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, warn};

use crate::core::clock::MonotonicClock;
use crate::types::{Sample, Token};

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Gesture(Token),
    Up,
    Down,
    Center,
    Quit,
    Other,
}

impl KeyInput {
    pub fn from_event(key: &KeyEvent) -> Self {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyInput::Quit;
        }
        match key.code {
            KeyCode::Char(c) => {
                if let Some(token) = Token::from_key(c) {
                    return KeyInput::Gesture(token);
                }
                match c.to_ascii_lowercase() {
                    'k' => KeyInput::Up,
                    'j' => KeyInput::Down,
                    ' ' => KeyInput::Center,
                    'q' => KeyInput::Quit,
                    _ => KeyInput::Other,
                }
            }
            KeyCode::Up => KeyInput::Up,
            KeyCode::Down => KeyInput::Down,
            KeyCode::Esc => KeyInput::Quit,
            _ => KeyInput::Other,
        }
    }
}

/// Raw-mode keyboard poller. Raw mode is restored on drop.
#[derive(Debug)]
pub struct KeyboardSource {
    quit_requested: bool,
}

impl KeyboardSource {
    /// Put the terminal in raw mode
    pub fn new() -> crate::Result<Self> {
        terminal::enable_raw_mode().map_err(|e| crate::Error::Terminal(e.to_string()))?;
        Ok(Self {
            quit_requested: false,
        })
    }

    /// Next key press, without blocking
    pub fn poll_key(&mut self) -> crate::Result<Option<KeyInput>> {
        let map_err = |e: std::io::Error| crate::Error::Terminal(e.to_string());
        while event::poll(Duration::ZERO).map_err(map_err)? {
            if let Event::Key(key) = event::read().map_err(map_err)? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let input = KeyInput::from_event(&key);
                if input == KeyInput::Quit {
                    self.quit_requested = true;
                }
                return Ok(Some(input));
            }
        }
        Ok(None)
    }

    /// Read function for the discrete engine: one non-blocking poll.
    /// Non-gesture keys yield a REST sample (rejected by the engine).
    pub fn read(&mut self) -> Option<Sample> {
        match self.poll_key() {
            Ok(Some(KeyInput::Gesture(token))) => Some(Sample::new(token, MonotonicClock::seconds())),
            Ok(Some(other)) => {
                debug!(?other, "non-gesture key during capture");
                Some(Sample::new(Token::Rest, MonotonicClock::seconds()))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "keyboard poll failed");
                None
            }
        }
    }

    /// Discard presses that arrived before the capture window opened
    pub fn drain(&mut self) -> crate::Result<usize> {
        let mut dropped = 0;
        while self.poll_key()?.is_some() {
            dropped += 1;
        }
        Ok(dropped)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl Drop for KeyboardSource {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}
