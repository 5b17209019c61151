use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use imgbatch_core::{GenerationRequest, Task};

use crate::executor::http::{HttpClient, HttpError};
use crate::executor::storage::{write_atomic, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("unexpected error during attempt: {0}")]
    Unexpected(String),
}

/// Result of one HTTP attempt for a task. Lives only inside the retry loop.
#[derive(Debug)]
pub struct AttemptOutcome {
    pub attempt_no: u32,
    pub error: Option<AttemptError>,
}

impl AttemptOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub(crate) async fn execute_attempt(
    http: &dyn HttpClient,
    task: &Task,
    request: &GenerationRequest,
    attempt_no: u32,
) -> AttemptOutcome {
    let error = match AssertUnwindSafe(run_attempt(http, task, request))
        .catch_unwind()
        .await
    {
        Ok(result) => result.err(),
        Err(payload) => Some(AttemptError::Unexpected(panic_message(payload.as_ref()))),
    };
    AttemptOutcome { attempt_no, error }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

async fn run_attempt(
    http: &dyn HttpClient,
    task: &Task,
    request: &GenerationRequest,
) -> Result<(), AttemptError> {
    let resp = http.post(request.url.clone(), task.config.timeout).await?;
    if !resp.is_success() {
        return Err(AttemptError::Status(resp.status));
    }
    if task.config.save {
        write_atomic(&task.output, &resp.body).await?;
    }
    Ok(())
}
