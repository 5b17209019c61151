use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum Event {
    RunStarted {
        total_tasks: usize,
        workers: usize,
    },
    RunFinished {
        total: usize,
        succeeded: usize,
    },
    WorkersClamped {
        requested: usize,
        effective: usize,
    },
    TaskStarted {
        task_index: usize,
        prompt: String,
        seed: u64,
    },
    TaskSucceeded {
        task_index: usize,
        attempts: u32,
        /// `None` when saving is disabled.
        output: Option<PathBuf>,
    },
    TaskFailed {
        task_index: usize,
        attempts: u32,
        prompt: String,
    },
    AttemptStarted {
        task_index: usize,
        attempt_no: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        task_index: usize,
        attempt_no: u32,
        error: String,
    },
    RetryScheduled {
        task_index: usize,
        attempt_no: u32,
        delay: Duration,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Forwards events to `tracing` as diagnostics.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::RunStarted { total_tasks, workers } => {
                tracing::info!(total_tasks, workers, "run started");
            }
            Event::RunFinished { total, succeeded } => {
                tracing::info!(total, succeeded, "run finished");
            }
            Event::WorkersClamped { requested, effective } => {
                tracing::info!(requested, effective, "worker count clamped");
            }
            Event::TaskStarted { task_index, seed, .. } => {
                tracing::debug!(task_index, seed, "task started");
            }
            Event::TaskSucceeded { task_index, attempts, .. } => {
                tracing::info!(task_index, attempts, "task succeeded");
            }
            Event::TaskFailed { task_index, attempts, .. } => {
                tracing::warn!(task_index, attempts, "task failed");
            }
            Event::AttemptStarted { task_index, attempt_no, .. } => {
                tracing::debug!(task_index, attempt_no, "attempt started");
            }
            Event::AttemptFailed { task_index, attempt_no, error } => {
                tracing::debug!(task_index, attempt_no, %error, "attempt failed");
            }
            Event::RetryScheduled { task_index, attempt_no, delay } => {
                tracing::debug!(task_index, attempt_no, delay_ms = delay.as_millis() as u64, "retry scheduled");
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
