// Copyright (c) 2025 - Cowboy AI, Inc.
//! Form validation domain
//!
//! - [`status`]: password verdicts and the rules behind them
//! - [`graph`]: the derivation graph over the three input cells
//! - [`sink`]: output registers read by the collaborator

pub mod graph;
pub mod sink;
pub mod status;

pub use graph::{DerivationGraph, FormInputs};
pub use sink::{OutputRegister, OutputSink, OutputSnapshot};
pub use status::{error_text, is_email_valid, is_password_strong, PasswordStatus};
