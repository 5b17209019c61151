mod config;
mod decision;

pub use config::RetryPolicy;
pub use decision::{RetryDecision, RetryReason};
