// Copyright (c) 2025 - Cowboy AI, Inc.
//! Password status and the rules that derive it
//!
//! The status is a pure function of three facts about the settled inputs.
//! Display text is looked up separately so the rules stay free of
//! presentation strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of characters for an email to be accepted
pub const MIN_EMAIL_CHARS: usize = 3;

/// Minimum number of characters for a password to count as strong
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Why the password fields do or do not validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStatus {
    /// No password entered
    Empty,
    /// Password shorter than [`MIN_PASSWORD_CHARS`]
    TooWeak,
    /// Password and repeat differ
    Mismatch,
    /// Nothing to complain about
    Valid,
}

impl PasswordStatus {
    /// Classify from the three derived facts
    ///
    /// First match wins: emptiness, then weakness, then mismatch.
    pub fn classify(empty: bool, strong: bool, equal: bool) -> Self {
        if empty {
            PasswordStatus::Empty
        } else if !strong {
            PasswordStatus::TooWeak
        } else if !equal {
            PasswordStatus::Mismatch
        } else {
            PasswordStatus::Valid
        }
    }

    /// Classify a settled pair of raw inputs
    pub fn evaluate(password: &str, repeat_password: &str) -> Self {
        Self::classify(
            password.is_empty(),
            is_password_strong(password),
            password == repeat_password,
        )
    }

    /// Whether this is [`PasswordStatus::Valid`]
    pub fn is_valid(self) -> bool {
        self == PasswordStatus::Valid
    }
}

impl fmt::Display for PasswordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PasswordStatus::Empty => "empty",
            PasswordStatus::TooWeak => "too_weak",
            PasswordStatus::Mismatch => "mismatch",
            PasswordStatus::Valid => "valid",
        };
        f.write_str(name)
    }
}

/// Text shown to the user for a status
pub fn error_text(status: PasswordStatus) -> &'static str {
    match status {
        PasswordStatus::Empty => "Password is empty",
        PasswordStatus::TooWeak => "Please pick a strong password",
        PasswordStatus::Mismatch => "Passwords don't match",
        PasswordStatus::Valid => "",
    }
}

/// Email rule: at least [`MIN_EMAIL_CHARS`] characters
pub fn is_email_valid(email: &str) -> bool {
    email.chars().count() >= MIN_EMAIL_CHARS
}

/// Strength rule: at least [`MIN_PASSWORD_CHARS`] characters
pub fn is_password_strong(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}
