mod attempt;
pub mod concurrency;
pub mod events;
pub mod http;
mod pool;
pub mod storage;
mod task;

pub use attempt::{AttemptError, AttemptOutcome};
pub use concurrency::{WorkerCount, WorkerLimits, DEFAULT_MAX_WORKERS};
pub use events::{CompositeEventSink, Event, EventSink, NoOpEventSink, TracingEventSink};
pub use http::{HttpClient, HttpError, HttpResponse, ReqwestHttpClient};
pub use pool::Coordinator;
pub use storage::{write_atomic, StorageError};
pub use task::TaskExecutor;
