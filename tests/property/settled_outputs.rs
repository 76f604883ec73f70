// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Settled Outputs
//!
//! Once every input has been quiet for the settle interval, the outputs must
//! equal what the pure rules say about the final input values, no matter
//! what was typed on the way there.

use std::sync::Arc;
use std::time::Duration;

use cim_form_validation::frp::VirtualScheduler;
use cim_form_validation::validation::{error_text, is_email_valid};
use cim_form_validation::{FormPipeline, PasswordStatus, PipelineConfig};
use proptest::prelude::*;

const SETTLE: Duration = Duration::from_millis(800);

/// One raw edit, paired in the strategy with the quiet time that follows it
#[derive(Debug, Clone)]
enum Edit {
    Email(String),
    Password(String),
    Repeat(String),
}

fn field_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{1,4}",
        "[a-z]{6,9}",
        "\\PC{0,8}",
    ]
}

fn edit() -> impl Strategy<Value = (Edit, u64)> {
    let edit = prop_oneof![
        field_text().prop_map(Edit::Email),
        field_text().prop_map(Edit::Password),
        field_text().prop_map(Edit::Repeat),
    ];
    (edit, 0u64..1200)
}

proptest! {
    #[test]
    fn prop_status_is_a_pure_priority_function(empty: bool, strong: bool, equal: bool) {
        let status = PasswordStatus::classify(empty, strong, equal);

        prop_assert_eq!(status == PasswordStatus::Empty, empty);
        prop_assert_eq!(status == PasswordStatus::TooWeak, !empty && !strong);
        prop_assert_eq!(status == PasswordStatus::Mismatch, !empty && strong && !equal);
        prop_assert_eq!(status.is_valid(), !empty && strong && equal);
        prop_assert_eq!(error_text(status).is_empty(), status.is_valid());
    }

    #[test]
    fn prop_settled_outputs_match_rules(
        edits in prop::collection::vec(edit(), 0..12),
        password in field_text(),
        repeat in field_text(),
    ) {
        let clock = VirtualScheduler::new();
        let pipeline = FormPipeline::new(PipelineConfig::default(), Arc::new(clock.clone())).unwrap();
        pipeline.start().unwrap();
        clock.advance(SETTLE);

        for (edit, gap_ms) in &edits {
            match edit {
                Edit::Email(text) => pipeline.set_email(text.as_str()).unwrap(),
                Edit::Password(text) => pipeline.set_password(text.as_str()).unwrap(),
                Edit::Repeat(text) => pipeline.set_repeat_password(text.as_str()).unwrap(),
            }
            clock.advance(Duration::from_millis(*gap_ms));
        }
        // a final write to both password fields always forces a fresh verdict
        pipeline.set_password(password.as_str()).unwrap();
        pipeline.set_repeat_password(repeat.as_str()).unwrap();
        clock.advance(SETTLE);

        let email = edits
            .iter()
            .rev()
            .find_map(|(edit, _)| match edit {
                Edit::Email(text) => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or("");
        let status = PasswordStatus::evaluate(&password, &repeat);

        let snapshot = pipeline.snapshot();
        prop_assert_eq!(snapshot.password_error_text.as_str(), error_text(status));
        prop_assert_eq!(snapshot.is_form_valid, status.is_valid() && is_email_valid(email));
        if snapshot.is_form_valid {
            prop_assert!(snapshot.password_error_text.is_empty());
        }
    }
}
