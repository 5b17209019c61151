#![forbid(unsafe_code)]

//! Runtime for imgbatch runs: a retrying single-task executor and the bounded
//! worker pool that drives it over a planned task list.

pub mod executor;
pub mod record;
pub mod retry;

pub use crate::executor::{
    Coordinator, Event, EventSink, HttpClient, HttpError, ReqwestHttpClient, TaskExecutor,
    WorkerLimits, DEFAULT_MAX_WORKERS,
};
pub use crate::record::{GenerationRecord, JsonlRecordSink, RecordError, RecordSink, RecordStatus};
pub use crate::retry::{RetryDecision, RetryPolicy, RetryReason};
