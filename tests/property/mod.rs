// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `operators`: stream operator laws over arbitrary write sequences
//! - `settled_outputs`: settled pipeline outputs match the pure rules

mod operators;
mod settled_outputs;
