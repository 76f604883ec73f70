// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{PipelineError, PipelineResult};

/// Quiet period applied by every debounce stage unless overridden
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(800);

/// Environment variable holding the settle interval in milliseconds
pub const SETTLE_INTERVAL_ENV: &str = "FORM_SETTLE_INTERVAL_MS";

/// Configuration for the validation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Debounce interval shared by all derivation stages
    pub settle_interval: Duration,
}

impl PipelineConfig {
    /// Create a configuration with the given settle interval
    pub fn new(settle_interval: Duration) -> Self {
        Self { settle_interval }
    }

    /// Set the settle interval
    pub fn with_settle_interval(mut self, settle_interval: Duration) -> Self {
        self.settle_interval = settle_interval;
        self
    }

    /// Load configuration from the environment
    ///
    /// Falls back to [`DEFAULT_SETTLE_INTERVAL`] when the variable is unset.
    pub fn from_env() -> PipelineResult<Self> {
        match std::env::var(SETTLE_INTERVAL_ENV) {
            Ok(raw) => Self::from_millis_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    fn from_millis_str(raw: &str) -> PipelineResult<Self> {
        let millis: u64 = raw.trim().parse()?;
        let config = Self::new(Duration::from_millis(millis));
        config.validate()?;
        Ok(config)
    }

    /// Reject intervals that would make debouncing meaningless
    pub fn validate(&self) -> PipelineResult<()> {
        if self.settle_interval.is_zero() {
            return Err(PipelineError::Configuration(
                "settle interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settle_interval: DEFAULT_SETTLE_INTERVAL,
        }
    }
}
