/// Most concurrent requests the public generation API tolerates before it
/// starts rejecting.
pub const DEFAULT_MAX_WORKERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerLimits {
    pub max_workers: usize,
}

impl Default for WorkerLimits {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCount {
    pub requested: usize,
    pub effective: usize,
}

impl WorkerCount {
    pub fn was_clamped(&self) -> bool {
        self.requested > self.effective
    }
}

impl WorkerLimits {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Effective worker count for a request; always within `1..=max_workers`.
    pub fn clamp(&self, requested: usize) -> WorkerCount {
        WorkerCount {
            requested,
            effective: requested.clamp(1, self.max_workers.max(1)),
        }
    }
}
