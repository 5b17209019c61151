use std::sync::Arc;

use imgbatch_core::{build_request, Seed, Task, TaskOutcome};

use crate::executor::attempt::execute_attempt;
use crate::executor::events::{Event, EventSink};
use crate::executor::http::HttpClient;
use crate::record::{GenerationRecord, RecordSink, RecordStatus};
use crate::retry::{RetryDecision, RetryPolicy};

/// Runs one task to completion under its retry policy. Every terminal state
/// is reported as a [`TaskOutcome`]; nothing escapes as an error.
pub struct TaskExecutor {
    http: Arc<dyn HttpClient>,
    event_sink: Arc<dyn EventSink>,
    records: Option<Arc<dyn RecordSink>>,
}

impl TaskExecutor {
    pub fn new(http: Arc<dyn HttpClient>, event_sink: Arc<dyn EventSink>) -> Self {
        Self {
            http,
            event_sink,
            records: None,
        }
    }

    pub fn with_records(mut self, records: Arc<dyn RecordSink>) -> Self {
        self.records = Some(records);
        self
    }

    pub async fn execute(&self, task: &Task) -> TaskOutcome {
        let seed = Seed::resolve(&task.config, &mut fastrand::Rng::new());
        let policy = RetryPolicy::from_config(&task.config);

        let request = match build_request(&task.prompt, &task.config, seed) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(task_index = task.index, error = %e, "unable to build request");
                return self.finish_failed(task, seed, 0).await;
            }
        };

        self.event_sink
            .emit(Event::TaskStarted {
                task_index: task.index,
                prompt: task.prompt.clone(),
                seed: seed.value(),
            })
            .await;

        let mut attempt_no = 0;
        loop {
            attempt_no += 1;
            self.event_sink
                .emit(Event::AttemptStarted {
                    task_index: task.index,
                    attempt_no,
                    max_attempts: policy.max_attempts,
                })
                .await;

            let outcome = execute_attempt(self.http.as_ref(), task, &request, attempt_no).await;
            let Some(error) = outcome.error else {
                return self.finish_succeeded(task, seed, attempt_no).await;
            };

            tracing::debug!(task_index = task.index, attempt_no, error = %error, "attempt failed");
            self.event_sink
                .emit(Event::AttemptFailed {
                    task_index: task.index,
                    attempt_no,
                    error: error.to_string(),
                })
                .await;

            match policy.decide(attempt_no) {
                RetryDecision::RetryAfter { delay, .. } => {
                    self.event_sink
                        .emit(Event::RetryScheduled {
                            task_index: task.index,
                            attempt_no,
                            delay,
                        })
                        .await;
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Stop { .. } => {
                    return self.finish_failed(task, seed, attempt_no).await;
                }
            }
        }
    }

    async fn finish_succeeded(&self, task: &Task, seed: Seed, attempts: u32) -> TaskOutcome {
        self.append_record(task, seed, RecordStatus::Success).await;
        self.event_sink
            .emit(Event::TaskSucceeded {
                task_index: task.index,
                attempts,
                output: task.config.save.then(|| task.output.clone()),
            })
            .await;
        TaskOutcome::success(task.index, attempts)
    }

    async fn finish_failed(&self, task: &Task, seed: Seed, attempts: u32) -> TaskOutcome {
        self.append_record(task, seed, RecordStatus::Failure).await;
        self.event_sink
            .emit(Event::TaskFailed {
                task_index: task.index,
                attempts,
                prompt: task.prompt.clone(),
            })
            .await;
        TaskOutcome::failure(task.index, attempts)
    }

    // A lost record does not change the task's outcome.
    async fn append_record(&self, task: &Task, seed: Seed, status: RecordStatus) {
        let Some(records) = &self.records else {
            return;
        };
        let record = GenerationRecord::for_task(task, seed, status);
        if let Err(e) = records.append(&record).await {
            tracing::warn!(task_index = task.index, error = %e, "failed to append generation record");
        }
    }
}
