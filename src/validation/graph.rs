// Copyright (c) 2025 - Cowboy AI, Inc.
//! Derivation Graph
//!
//! Wires the three input cells into the derived streams the form needs.
//! Every stage is debounced by the same settle interval so a burst of
//! keystrokes produces one recomputation.
//!
//! ```text
//! email ──debounce─distinct─map─────────────────────────────► email_valid ─┐
//! password ─┬─debounce─distinct─share─┬─map─► password_strong ─┐            │
//!           │                         └─map─► password_empty ──┼─► status ──┼─► is_form_valid
//!           └─┐                                                │  (shared)  │
//! repeat ─────┴─combine─debounce─map──────► passwords_equal ───┘     └─drop_first(1)─► error_text
//! ```
//!
//! The password pair is debounced after combining, not per field. A quick
//! edit to either field therefore yields a single comparison once both have
//! settled.
//!
//! The settled password and the status are shared: both outputs hang off one
//! status chain, so a password write starts two timers however many
//! subscribers the outputs have, and both outputs see each verdict in the
//! order they subscribed.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::status::{error_text, is_email_valid, is_password_strong, PasswordStatus};
use crate::frp::{combine_latest2, combine_latest3, Scheduler, SourceCell, Stream};

/// The three raw inputs of the form
#[derive(Debug, Clone)]
pub struct FormInputs {
    /// Email address field
    pub email: SourceCell<String>,
    /// Password field
    pub password: SourceCell<String>,
    /// Repeated password field
    pub repeat_password: SourceCell<String>,
}

impl FormInputs {
    /// Create empty inputs
    pub fn new() -> Self {
        Self {
            email: SourceCell::new("email", String::new()),
            password: SourceCell::new("password", String::new()),
            repeat_password: SourceCell::new("repeat_password", String::new()),
        }
    }
}

impl Default for FormInputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived streams of the validation form
#[derive(Debug, Clone)]
pub struct DerivationGraph {
    /// Settled email satisfies the email rule
    pub email_valid: Stream<bool>,
    /// Settled password satisfies the strength rule
    pub password_strong: Stream<bool>,
    /// Settled password is empty
    pub password_empty: Stream<bool>,
    /// Settled password pair is equal
    pub passwords_equal: Stream<bool>,
    /// Combined password verdict
    pub password_status: Stream<PasswordStatus>,
    /// Whole form can be submitted
    pub is_form_valid: Stream<bool>,
    /// Display text for the password status, minus the initial verdict
    pub password_error_text: Stream<String>,
}

impl DerivationGraph {
    /// Build the graph over `inputs`
    ///
    /// Nothing runs until a derived stream is subscribed. Shared stages are
    /// connected by their first subscriber, so subscribe every output before
    /// the first settle interval elapses.
    pub fn build(inputs: &FormInputs, settle: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        let settled_password = inputs
            .password
            .stream()
            .debounce(settle, scheduler.clone())
            .distinct_until_changed()
            .share();

        let email_valid = inputs
            .email
            .stream()
            .debounce(settle, scheduler.clone())
            .distinct_until_changed()
            .map(|email| is_email_valid(&email));

        let password_strong = settled_password.map(|password| is_password_strong(&password));
        let password_empty = settled_password.map(|password| password.is_empty());

        let passwords_equal = combine_latest2(
            &inputs.password.stream(),
            &inputs.repeat_password.stream(),
        )
        .debounce(settle, scheduler)
        .map(|(password, repeat)| password == repeat);

        let password_status = combine_latest3(&password_empty, &password_strong, &passwords_equal)
            .map(|(empty, strong, equal)| {
                let status = PasswordStatus::classify(empty, strong, equal);
                debug!(empty, strong, equal, %status, "password status derived");
                status
            })
            .share();

        let is_form_valid = combine_latest2(&password_status, &email_valid)
            .map(|(status, email_valid)| status.is_valid() && email_valid);

        let password_error_text = password_status
            .drop_first(1)
            .map(|status| error_text(status).to_string());

        Self {
            email_valid,
            password_strong,
            password_empty,
            passwords_equal,
            password_status,
            is_form_valid,
            password_error_text,
        }
    }
}
