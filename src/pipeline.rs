// Copyright (c) 2025 - Cowboy AI, Inc.
//! Form validation pipeline
//!
//! [`FormPipeline`] is the surface a UI talks to. It owns the input cells,
//! the output sink and the subscription registry, and moves through a
//! one-way lifecycle:
//!
//! ```text
//! Idle ──start()──► Running ──stop()──► Stopped
//!   └───────────────stop()─────────────────┘
//! ```
//!
//! Inputs written while idle are kept and replayed when the graph is wired.
//! Once stopped, setters and output subscriptions are rejected with
//! [`PipelineError::Inactive`].
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = FormPipeline::with_tokio(PipelineConfig::default())?;
//! pipeline.on_form_validity_changed(|valid| println!("submit enabled: {valid}"))?;
//! pipeline.start()?;
//!
//! pipeline.set_email("abc")?;
//! pipeline.set_password("abcdef")?;
//! pipeline.set_repeat_password("abcdef")?;
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::frp::{lock, Scheduler, Subscription, SubscriptionRegistry, TokioScheduler};
use crate::validation::{DerivationGraph, FormInputs, OutputSink, OutputSnapshot};

/// Lifecycle stage of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, graph not wired
    Idle,
    /// Graph wired and processing
    Running,
    /// Torn down for good
    Stopped,
}

/// Reactive validation pipeline for the sign-up form
pub struct FormPipeline {
    config: PipelineConfig,
    scheduler: Arc<dyn Scheduler>,
    inputs: FormInputs,
    sink: Arc<OutputSink>,
    registry: SubscriptionRegistry,
    lifecycle: Mutex<Lifecycle>,
}

impl FormPipeline {
    /// Create a pipeline using `scheduler` for every debounce timer
    pub fn new(config: PipelineConfig, scheduler: Arc<dyn Scheduler>) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scheduler,
            inputs: FormInputs::new(),
            sink: Arc::new(OutputSink::new()),
            registry: SubscriptionRegistry::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
        })
    }

    /// Create a pipeline on the current tokio runtime
    pub fn with_tokio(config: PipelineConfig) -> PipelineResult<Self> {
        Self::new(config, Arc::new(TokioScheduler::current()?))
    }

    /// Configuration in effect
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current lifecycle stage
    pub fn lifecycle(&self) -> Lifecycle {
        *lock(&self.lifecycle)
    }

    /// Wire the derivation graph into the output sink
    ///
    /// Calling it again while running does nothing.
    pub fn start(&self) -> PipelineResult<()> {
        let mut lifecycle = lock(&self.lifecycle);
        match *lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Stopped => return Err(PipelineError::inactive("start")),
            Lifecycle::Idle => {}
        }

        let graph = DerivationGraph::build(
            &self.inputs,
            self.config.settle_interval,
            self.scheduler.clone(),
        );

        // text first: a `Valid` verdict clears the message before the flag rises
        let sink = self.sink.clone();
        self.registry.track(graph.password_error_text.subscribe(move |text| {
            debug!(text = %text, "password error text assigned");
            sink.assign_password_error_text(text);
        }));

        let sink = self.sink.clone();
        self.registry.track(graph.is_form_valid.subscribe(move |valid| {
            debug!(valid, "form validity assigned");
            sink.assign_form_validity(valid);
        }));

        *lifecycle = Lifecycle::Running;
        info!(
            settle_ms = self.config.settle_interval.as_millis() as u64,
            subscriptions = self.registry.len(),
            "form pipeline started"
        );
        Ok(())
    }

    /// Tear down every subscription
    ///
    /// Pending debounce timers are cancelled and an assignment already
    /// running on a timer thread is waited for, so no output changes after
    /// this returns. Calling it again does nothing.
    pub fn stop(&self) -> PipelineResult<()> {
        {
            let mut lifecycle = lock(&self.lifecycle);
            if *lifecycle == Lifecycle::Stopped {
                return Ok(());
            }
            *lifecycle = Lifecycle::Stopped;
        }
        let cancelled = self.registry.cancel_all();
        info!(cancelled, "form pipeline stopped");
        Ok(())
    }

    fn ensure_active(&self, operation: &'static str) -> PipelineResult<()> {
        if self.lifecycle() == Lifecycle::Stopped {
            return Err(PipelineError::inactive(operation));
        }
        Ok(())
    }

    /// Raw edit of the email field
    pub fn set_email(&self, email: impl Into<String>) -> PipelineResult<()> {
        self.ensure_active("set email")?;
        self.inputs.email.set(email.into());
        Ok(())
    }

    /// Raw edit of the password field
    pub fn set_password(&self, password: impl Into<String>) -> PipelineResult<()> {
        self.ensure_active("set password")?;
        self.inputs.password.set(password.into());
        Ok(())
    }

    /// Raw edit of the repeated password field
    pub fn set_repeat_password(&self, repeat_password: impl Into<String>) -> PipelineResult<()> {
        self.ensure_active("set repeat password")?;
        self.inputs.repeat_password.set(repeat_password.into());
        Ok(())
    }

    /// Call `listener` whenever the validity flag is assigned
    pub fn on_form_validity_changed<F>(&self, listener: F) -> PipelineResult<Subscription>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.ensure_active("subscribe to form validity")?;
        Ok(self.sink.form_valid.on_change(move |valid| listener(*valid)))
    }

    /// Call `listener` whenever the password error text is assigned
    pub fn on_password_error_text_changed<F>(&self, listener: F) -> PipelineResult<Subscription>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.ensure_active("subscribe to password error text")?;
        Ok(self
            .sink
            .password_error_text
            .on_change(move |text: &String| listener(text)))
    }

    /// Async view of the validity flag
    pub fn watch_form_validity(&self) -> PipelineResult<watch::Receiver<bool>> {
        self.ensure_active("watch form validity")?;
        Ok(self.sink.form_valid.watch())
    }

    /// Async view of the password error text
    pub fn watch_password_error_text(&self) -> PipelineResult<watch::Receiver<String>> {
        self.ensure_active("watch password error text")?;
        Ok(self.sink.password_error_text.watch())
    }

    /// Latest validity flag
    pub fn is_form_valid(&self) -> bool {
        self.sink.form_valid.get()
    }

    /// Latest password error text
    pub fn password_error_text(&self) -> String {
        self.sink.password_error_text.get()
    }

    /// Both outputs at once
    pub fn snapshot(&self) -> OutputSnapshot {
        self.sink.snapshot()
    }
}

impl Drop for FormPipeline {
    fn drop(&mut self) {
        self.registry.cancel_all();
    }
}

impl fmt::Debug for FormPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormPipeline")
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle())
            .field("inputs", &self.inputs)
            .field("outputs", &self.snapshot())
            .finish_non_exhaustive()
    }
}
