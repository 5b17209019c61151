use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use imgbatch_core::{aggregate, Task, TaskOutcome};
use tokio::sync::{mpsc, Mutex};

use crate::executor::concurrency::WorkerLimits;
use crate::executor::events::{Event, EventSink};
use crate::executor::task::TaskExecutor;

/// Dispatches a planned task list over a bounded pool of workers and blocks
/// until every task has produced exactly one outcome.
pub struct Coordinator {
    executor: Arc<TaskExecutor>,
    event_sink: Arc<dyn EventSink>,
    limits: WorkerLimits,
}

impl Coordinator {
    pub fn new(executor: Arc<TaskExecutor>, event_sink: Arc<dyn EventSink>) -> Self {
        Self {
            executor,
            event_sink,
            limits: WorkerLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: WorkerLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Outcomes are returned in completion order, not submission order.
    pub async fn run(&self, tasks: Vec<Task>, requested_workers: usize) -> Vec<TaskOutcome> {
        let count = self.limits.clamp(requested_workers);
        let parallel = count.effective > 1 && tasks.len() > 1;
        if parallel && count.was_clamped() {
            tracing::debug!(
                requested = count.requested,
                effective = count.effective,
                "requested worker count exceeds the service limit"
            );
            self.event_sink
                .emit(Event::WorkersClamped {
                    requested: count.requested,
                    effective: count.effective,
                })
                .await;
        }

        let workers = if parallel { count.effective } else { 1 };
        self.event_sink
            .emit(Event::RunStarted {
                total_tasks: tasks.len(),
                workers,
            })
            .await;

        let outcomes = if parallel {
            self.run_pool(tasks, workers).await
        } else {
            self.run_sequential(tasks).await
        };

        let result = aggregate(&outcomes);
        self.event_sink
            .emit(Event::RunFinished {
                total: result.total,
                succeeded: result.succeeded,
            })
            .await;
        outcomes
    }

    async fn run_sequential(&self, tasks: Vec<Task>) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in &tasks {
            outcomes.push(run_guarded(&self.executor, self.event_sink.as_ref(), task).await);
        }
        outcomes
    }

    async fn run_pool(&self, tasks: Vec<Task>, workers: usize) -> Vec<TaskOutcome> {
        let total = tasks.len();
        let indices: Vec<usize> = tasks.iter().map(|t| t.index).collect();

        // Both channels hold the whole run, so neither side ever blocks on send.
        let (task_tx, task_rx) = mpsc::channel::<Task>(total.max(1));
        let (result_tx, mut result_rx) = mpsc::channel::<TaskOutcome>(total.max(1));
        for task in tasks {
            if task_tx.send(task).await.is_err() {
                break;
            }
        }
        drop(task_tx);

        let task_rx = Arc::new(Mutex::new(task_rx));
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let executor = self.executor.clone();
            let event_sink = self.event_sink.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let next = task_rx.lock().await.recv().await;
                    let Some(task) = next else { break };
                    tracing::trace!(worker_id, task_index = task.index, "worker picked task");
                    let outcome = run_guarded(&executor, event_sink.as_ref(), &task).await;
                    if result_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut outcomes = Vec::with_capacity(total);
        while outcomes.len() < total {
            match result_rx.recv().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "worker terminated abnormally");
            }
        }

        if outcomes.len() < total {
            let seen: HashSet<usize> = outcomes.iter().map(|o| o.task_index).collect();
            for index in indices.into_iter().filter(|i| !seen.contains(i)) {
                outcomes.push(TaskOutcome::failure(index, 0));
            }
        }
        outcomes
    }
}

/// Runs one task. Attempt panics are already retried inside the executor;
/// this catches anything that escapes around them, such as a panicking sink.
async fn run_guarded(executor: &TaskExecutor, event_sink: &dyn EventSink, task: &Task) -> TaskOutcome {
    match AssertUnwindSafe(executor.execute(task)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(task_index = task.index, "task panicked; counting it as failed");
            event_sink
                .emit(Event::TaskFailed {
                    task_index: task.index,
                    attempts: 0,
                    prompt: task.prompt.clone(),
                })
                .await;
            TaskOutcome::failure(task.index, 0)
        }
    }
}
