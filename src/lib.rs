//! Reactive form validation for the Composable Information Machine
//!
//! Derives a "form is submittable" flag and a password error message from
//! three raw text inputs. Raw edits flow through a graph of time-aware
//! stream operators (debounce, dedup, combine-latest) so only settled values
//! reach the outputs.
//!
//! - [`frp`]: streams, source cells, operators, schedulers, subscriptions
//! - [`validation`]: password rules, the derivation graph, output registers
//! - [`pipeline`]: the lifecycle-managed facade used by a UI

pub mod config;
pub mod errors;
pub mod frp;
pub mod pipeline;
pub mod validation;

// Re-export commonly used types
pub use config::{PipelineConfig, DEFAULT_SETTLE_INTERVAL};
pub use errors::{PipelineError, PipelineResult};
pub use pipeline::{FormPipeline, Lifecycle};
pub use validation::{OutputSnapshot, PasswordStatus};
