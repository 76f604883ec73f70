// Copyright (c) 2025 - Cowboy AI, Inc.
//! Form Validator Console
//!
//! Drives the validation pipeline from stdin, one edit per line:
//!
//! ```text
//! email alice@example.com
//! password hunter22
//! repeat hunter22
//! show
//! quit
//! ```
//!
//! Output changes are logged as they settle. On EOF or `quit` the console
//! waits one settle interval and prints the final outputs as JSON.
//!
//! Run with: cargo run --bin form-validator
//!
//! Configuration:
//! - `FORM_SETTLE_INTERVAL_MS`: debounce interval (default 800)
//! - `RUST_LOG`: tracing filter

use anyhow::{Context, Result};
use cim_form_validation::{FormPipeline, PipelineConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// One parsed console line
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Email(&'a str),
    Password(&'a str),
    Repeat(&'a str),
    Show,
    Quit,
    Blank,
    Unknown(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let (verb, value) = line.split_once(' ').unwrap_or((line, ""));
    match verb.trim() {
        "email" => Command::Email(value),
        "password" => Command::Password(value),
        "repeat" => Command::Repeat(value),
        "show" => Command::Show,
        "quit" | "exit" => Command::Quit,
        "" => Command::Blank,
        other => Command::Unknown(other),
    }
}

fn print_snapshot(pipeline: &FormPipeline) -> Result<()> {
    let json = serde_json::to_string(&pipeline.snapshot()).context("Failed to encode outputs")?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    info!(settle_ms = config.settle_interval.as_millis() as u64, "configuration loaded");

    let pipeline = FormPipeline::with_tokio(config).context("Failed to create pipeline")?;
    let _validity = pipeline.on_form_validity_changed(|valid| info!(valid, "form validity"))?;
    let _error_text =
        pipeline.on_password_error_text_changed(|text| info!(text, "password error text"))?;
    pipeline.start()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse(&line) {
            Command::Email(value) => pipeline.set_email(value)?,
            Command::Password(value) => pipeline.set_password(value)?,
            Command::Repeat(value) => pipeline.set_repeat_password(value)?,
            Command::Show => print_snapshot(&pipeline)?,
            Command::Quit => break,
            Command::Blank => {}
            Command::Unknown(verb) => warn!(command = verb, "unknown command"),
        }
    }

    tokio::time::sleep(config.settle_interval).await;
    print_snapshot(&pipeline)?;
    pipeline.stop()?;
    Ok(())
}
