use serde::Serialize;

/// Final result of one task after its retries are exhausted or it succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub task_index: usize,
    pub succeeded: bool,
    pub attempts: u32,
}

impl TaskOutcome {
    pub fn success(task_index: usize, attempts: u32) -> Self {
        Self {
            task_index,
            succeeded: true,
            attempts,
        }
    }

    pub fn failure(task_index: usize, attempts: u32) -> Self {
        Self {
            task_index,
            succeeded: false,
            attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub total: usize,
    pub succeeded: usize,
}

impl RunResult {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// The run succeeds only when every requested task succeeded.
    pub fn is_success(&self) -> bool {
        self.succeeded == self.total
    }
}

pub fn aggregate<'a, I>(outcomes: I) -> RunResult
where
    I: IntoIterator<Item = &'a TaskOutcome>,
{
    outcomes
        .into_iter()
        .fold(RunResult::default(), |mut acc, o| {
            acc.total += 1;
            if o.succeeded {
                acc.succeeded += 1;
            }
            acc
        })
}
