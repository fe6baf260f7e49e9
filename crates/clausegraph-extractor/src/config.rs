//! Configuration for the Extractor
//!
//! Engine-wide settings. Everything that differs per document type lives
//! in `DocumentTypeConfig` instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
///
/// Missing keys in TOML fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (bytes)
    pub max_text_length: usize,

    /// Attempts per chunk × pass, including the first
    pub max_attempts: usize,

    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u64,

    /// Upper bound on the retry delay (milliseconds)
    pub max_backoff_ms: u64,

    /// Maximum time for a single model call (seconds)
    pub call_timeout_secs: u64,

    /// Chunk distance within which related clauses are linked by proximity
    pub proximity_window_chunks: usize,

    /// Strength multiplier for relationships inferred from proximity alone
    pub proximity_factor: f64,

    /// Fraction of the chunk size searched backwards for a natural boundary
    pub boundary_slack_ratio: f64,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get the initial backoff as a Duration
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Get the maximum backoff as a Duration
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err("initial_backoff_ms cannot exceed max_backoff_ms".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.proximity_factor) {
            return Err(format!(
                "proximity_factor {} out of range [0.0, 1.0]",
                self.proximity_factor
            ));
        }
        if !(0.0..0.5).contains(&self.boundary_slack_ratio) {
            return Err(format!(
                "boundary_slack_ratio {} out of range [0.0, 0.5)",
                self.boundary_slack_ratio
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 500_000,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            call_timeout_secs: 120,
            proximity_window_chunks: 1,
            proximity_factor: 0.7,
            boundary_slack_ratio: 0.2,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: short timeouts, fast retries, same-chunk proximity only
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 200_000,
            max_attempts: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
            call_timeout_secs: 60,
            proximity_window_chunks: 0,
            proximity_factor: 0.7,
            boundary_slack_ratio: 0.2,
        }
    }

    /// Lenient preset: long timeouts, more retries, wider proximity window
    pub fn lenient() -> Self {
        Self {
            max_text_length: 2_000_000,
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            call_timeout_secs: 300,
            proximity_window_chunks: 2,
            proximity_factor: 0.7,
            boundary_slack_ratio: 0.3,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = ExtractorConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_ordering() {
        let mut config = ExtractorConfig::default();
        config.initial_backoff_ms = config.max_backoff_ms + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_proximity_factor_range() {
        let mut config = ExtractorConfig::default();
        config.proximity_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_attempts = 5\nproximity_window_chunks = 0").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.proximity_window_chunks, 0);
        assert_eq!(config.call_timeout_secs, 120);
    }

    #[test]
    fn test_duration_conversions() {
        let config = ExtractorConfig::default();
        assert_eq!(config.call_timeout(), Duration::from_secs(120));
        assert_eq!(config.initial_backoff(), Duration::from_millis(500));
        assert_eq!(config.max_backoff(), Duration::from_millis(8_000));
    }
}
