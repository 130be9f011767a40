use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Retention and timing knobs for the correlation engine.
///
/// Capacity caps are configuration, not schema: persisted tiers carry however
/// many records were live when they were written, and the caps are re-applied
/// on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum records kept in the in-memory working set.
    pub working_set_limit: usize,
    /// Maximum records kept in the persisted archive tier.
    pub archive_limit: usize,
    /// Default number of records handed to display callers.
    pub display_limit: usize,
    /// Window within which a repeated operation fingerprint is suppressed.
    pub dedup_window_ms: u64,
    /// Interval between background sweeps of expired dedup markers.
    pub dedup_sweep_interval_ms: u64,
    /// How long a submission waits for its confirmation before timing out.
    pub pending_ttl_ms: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            working_set_limit: 2_000,
            archive_limit: 5_000,
            display_limit: 100,
            dedup_window_ms: 5_000,
            dedup_sweep_interval_ms: 10_000,
            pending_ttl_ms: 30_000,
        }
    }
}

impl RetentionConfig {
    /// Parses a config document and validates it.
    pub fn from_json(document: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field constraints the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working_set_limit == 0 {
            return Err(ConfigError::Invalid(
                "working_set_limit must be at least 1".into(),
            ));
        }
        if self.archive_limit < self.working_set_limit {
            return Err(ConfigError::Invalid(format!(
                "archive_limit {} must be >= working_set_limit {}",
                self.archive_limit, self.working_set_limit
            )));
        }
        if self.dedup_window_ms == 0 {
            return Err(ConfigError::Invalid("dedup_window_ms must be non-zero".into()));
        }
        if self.dedup_sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "dedup_sweep_interval_ms must be non-zero".into(),
            ));
        }
        if self.pending_ttl_ms == 0 {
            return Err(ConfigError::Invalid("pending_ttl_ms must be non-zero".into()));
        }
        Ok(())
    }
}

/// Errors surfaced while loading or validating retention configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid retention config: {0}")]
    Invalid(String),
    #[error("malformed config document: {0}")]
    Parse(#[from] serde_json::Error),
}
