// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for pipeline operations

use thiserror::Error;

/// Errors that can occur while driving the validation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The pipeline was stopped and no longer accepts the operation
    #[error("Inactive pipeline: cannot {operation} after stop")]
    Inactive {
        /// The rejected operation
        operation: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No async runtime available for real-time timers
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl PipelineError {
    pub(crate) fn inactive(operation: &'static str) -> Self {
        PipelineError::Inactive { operation }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<std::num::ParseIntError> for PipelineError {
    fn from(err: std::num::ParseIntError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}
