use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use imgbatch_exec::executor::{Event, EventSink};

/// Narrates the run on stderr, one line per event.
pub struct ProgressEventSink {
    total_tasks: usize,
    done: AtomicUsize,
}

impl ProgressEventSink {
    pub fn new(total_tasks: usize) -> Self {
        Self {
            total_tasks,
            done: AtomicUsize::new(0),
        }
    }

    fn label(&self, task_index: usize) -> String {
        if self.total_tasks > 1 {
            format!("[{}/{}] ", task_index + 1, self.total_tasks)
        } else {
            String::new()
        }
    }

    fn finish_one(&self) -> usize {
        self.done.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::WorkersClamped { effective, .. } => {
                eprintln!(
                    "Warning: Maximum recommended threads is {effective}. Setting threads to {effective}."
                );
            }
            Event::RunStarted { workers, .. } if workers > 1 => {
                eprintln!("Using {workers} threads for concurrent generation.");
            }
            Event::TaskStarted { task_index, prompt, seed } => {
                eprintln!(
                    "{}Generating image with prompt: '{prompt}' and seed: {seed}",
                    self.label(task_index)
                );
            }
            Event::AttemptStarted { task_index, attempt_no, max_attempts } => {
                eprintln!("{}Attempt {attempt_no} of {max_attempts}...", self.label(task_index));
            }
            Event::AttemptFailed { task_index, attempt_no, error } => {
                eprintln!(
                    "{}Generation failed on attempt {attempt_no}: {error}",
                    self.label(task_index)
                );
            }
            Event::RetryScheduled { task_index, delay, .. } => {
                eprintln!(
                    "{}Retrying in {} seconds...",
                    self.label(task_index),
                    delay.as_secs_f64()
                );
            }
            Event::TaskSucceeded { task_index, output, .. } => {
                let done = self.finish_one();
                match output {
                    Some(path) => eprintln!(
                        "{}Image saved to {} ({done}/{} done)",
                        self.label(task_index),
                        path.display(),
                        self.total_tasks
                    ),
                    None => eprintln!(
                        "{}Image generated but not saved (due to --no-save). ({done}/{} done)",
                        self.label(task_index),
                        self.total_tasks
                    ),
                }
            }
            Event::TaskFailed { task_index, prompt, .. } => {
                let done = self.finish_one();
                eprintln!(
                    "{}All retry attempts failed for prompt: '{prompt}' ({done}/{} done)",
                    self.label(task_index),
                    self.total_tasks
                );
            }
            _ => {}
        }
    }
}
