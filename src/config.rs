//! Harness configuration (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::DiscreteTrialEngine;
use crate::types::TrackerConfig;
use crate::{DEFAULT_COUNTDOWN_MS, DEFAULT_K_SAMPLES, DEFAULT_WINDOW_MS};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    #[serde(default)]
    pub discrete: DiscreteConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Discrete (RPS) trial settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscreteConfig {
    pub countdown_ms: u64,
    pub window_ms: u64,
    pub k_samples: usize,
}

/// Input adapter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pending key presses held before new ones are dropped
    pub queue_capacity: usize,
    /// Analog change per Up/Down press
    pub analog_step: f64,
}

impl Default for DiscreteConfig {
    fn default() -> Self {
        Self {
            countdown_ms: DEFAULT_COUNTDOWN_MS,
            window_ms: DEFAULT_WINDOW_MS,
            k_samples: DEFAULT_K_SAMPLES,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            analog_step: 0.1,
        }
    }
}

impl DiscreteConfig {
    pub fn engine(&self) -> DiscreteTrialEngine {
        DiscreteTrialEngine::new(self.countdown_ms, self.window_ms, self.k_samples)
    }
}

impl HarnessConfig {
    /// Validate every section; returns the first invalid field
    pub fn validate(&self) -> crate::Result<()> {
        if self.discrete.window_ms == 0 {
            return Err(crate::Error::Config("window_ms must be > 0".to_string()));
        }
        if self.discrete.k_samples == 0 {
            return Err(crate::Error::Config("k_samples must be > 0".to_string()));
        }
        self.tracker.validate()?;
        if self.input.queue_capacity == 0 {
            return Err(crate::Error::Config("queue_capacity must be > 0".to_string()));
        }
        if !(self.input.analog_step > 0.0 && self.input.analog_step <= 1.0) {
            return Err(crate::Error::Config(format!(
                "analog_step must be in (0, 1], got {}",
                self.input.analog_step
            )));
        }
        Ok(())
    }

    /// Load and validate config from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file, creating parent directories
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.discrete.window_ms, 2000);
        assert_eq!(config.discrete.k_samples, 5);
        assert_eq!(config.tracker.tick_hz, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_sections() {
        let toml = HarnessConfig::default().to_toml().unwrap();
        assert!(toml.contains("[discrete]"));
        assert!(toml.contains("[tracker]"));
        assert!(toml.contains("[input]"));
        assert!(toml.contains("target_kind = \"sine\""));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: HarnessConfig = toml::from_str(
            "[tracker]\ntarget_kind = \"steps\"\nduration_s = 4.0\n",
        )
        .unwrap();
        assert_eq!(config.tracker.target_kind, TargetKind::Steps);
        assert_eq!(config.tracker.duration_s, 4.0);
        assert_eq!(config.tracker.tick_hz, 50.0);
        assert_eq!(config.discrete, DiscreteConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = HarnessConfig::default();
        config.discrete.window_ms = 0;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_engine_from_config() {
        let engine = DiscreteConfig::default().engine();
        assert_eq!(engine.window_ms, DEFAULT_WINDOW_MS);
        assert_eq!(engine.countdown_ms, DEFAULT_COUNTDOWN_MS);
    }
}
