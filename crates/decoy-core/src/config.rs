//! Engine configuration.
//!
//! All options have defaults, so an empty TOML document is a valid
//! configuration. Durations are expressed in whole seconds (milliseconds for
//! the advisory timeout) to keep the file format flat.

use crate::error::{DecoyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Lowest completeness threshold a session may be assigned.
pub const MIN_COMPLETENESS_THRESHOLD: u8 = 65;
/// Highest completeness threshold a session may be assigned.
pub const MAX_COMPLETENESS_THRESHOLD: u8 = 85;

/// Root configuration for the conversation engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard cap on counterparty messages per session.
    pub max_messages: u32,
    /// Minimum counterparty messages before the completeness rule may end a session.
    pub min_messages_for_extraction: u32,
    /// Hard cap on session wall-clock duration.
    pub max_duration_secs: u64,
    /// Maximum silence between two messages before the session is closed.
    pub inactivity_timeout_secs: u64,
    /// Frustration level at which the fallback rule ends the session.
    pub frustration_threshold: u8,
    /// Increment applied per message that carries impatience markers.
    pub frustration_step: u8,
    /// Center of the per-session completeness threshold.
    pub completeness_threshold_base: u8,
    /// Maximum deviation from the base threshold.
    pub completeness_threshold_jitter: u8,
    /// How long completed sessions are retained before the sweep drops them.
    pub retention_window_secs: u64,
    /// Interval of the background sweep.
    pub sweep_interval_secs: u64,
    /// Number of history entries each tracker retains.
    pub history_capacity: usize,
    /// Advisory decision service settings.
    pub advisory: AdvisoryConfig,
}

/// Settings for consulting the external advisory decision service.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    /// Minimum counterparty messages before the advisory is consulted.
    pub min_messages: u32,
    /// Minimum history entries needed to give the advisory useful context.
    pub min_history: usize,
    /// Number of trailing history entries sent with each request.
    pub history_window: usize,
    pub timeout_ms: u64,
    /// Recommendations below this confidence are ignored.
    pub min_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_messages: 30,
            min_messages_for_extraction: 5,
            max_duration_secs: 30 * 60,
            inactivity_timeout_secs: 5 * 60,
            frustration_threshold: 80,
            frustration_step: 15,
            completeness_threshold_base: 75,
            completeness_threshold_jitter: 10,
            retention_window_secs: 60 * 60,
            sweep_interval_secs: 15 * 60,
            history_capacity: 50,
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_messages: 3,
            min_history: 4,
            history_window: 10,
            timeout_ms: 5_000,
            min_confidence: 0.6,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DecoyError::io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_messages == 0 {
            return Err(DecoyError::config("max_messages must be at least 1"));
        }
        if self.max_duration_secs == 0 || self.inactivity_timeout_secs == 0 {
            return Err(DecoyError::config(
                "max_duration_secs and inactivity_timeout_secs must be positive",
            ));
        }
        if self.frustration_threshold > 100 {
            return Err(DecoyError::config("frustration_threshold must be <= 100"));
        }
        let base = self.completeness_threshold_base;
        if !(MIN_COMPLETENESS_THRESHOLD..=MAX_COMPLETENESS_THRESHOLD).contains(&base) {
            return Err(DecoyError::config(format!(
                "completeness_threshold_base must be within [{}, {}], got {}",
                MIN_COMPLETENESS_THRESHOLD, MAX_COMPLETENESS_THRESHOLD, base
            )));
        }
        let max_jitter = (base - MIN_COMPLETENESS_THRESHOLD).max(MAX_COMPLETENESS_THRESHOLD - base);
        if self.completeness_threshold_jitter > max_jitter {
            return Err(DecoyError::config(format!(
                "completeness_threshold_jitter {} reaches outside [{}, {}]",
                self.completeness_threshold_jitter,
                MIN_COMPLETENESS_THRESHOLD,
                MAX_COMPLETENESS_THRESHOLD
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(DecoyError::config("sweep_interval_secs must be positive"));
        }
        if !(0.0..=1.0).contains(&self.advisory.min_confidence) {
            return Err(DecoyError::config("advisory.min_confidence must be within [0, 1]"));
        }
        Ok(())
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
