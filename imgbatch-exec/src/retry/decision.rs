use std::time::Duration;

use crate::retry::config::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    AttemptsExhausted,
    FixedDelay,
}

impl RetryPolicy {
    /// Decide what happens after attempt `attempt_no` (1-based) failed.
    pub fn decide(&self, attempt_no: u32) -> RetryDecision {
        if attempt_no >= self.max_attempts {
            return RetryDecision::Stop {
                reason: RetryReason::AttemptsExhausted,
            };
        }
        RetryDecision::RetryAfter {
            delay: self.delay,
            reason: RetryReason::FixedDelay,
        }
    }
}
