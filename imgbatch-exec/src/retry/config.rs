use std::time::Duration;

use imgbatch_core::GenerationConfig;

/// Fixed-delay retry schedule for a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Initial attempt plus retries. Never zero.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            delay,
        }
    }

    pub fn from_config(cfg: &GenerationConfig) -> Self {
        Self::new(cfg.retries, cfg.retry_delay)
    }
}
