#![forbid(unsafe_code)]

//! Configuration, request building, task planning and result accounting for
//! bulk image generation runs.
//!
//! Nothing in this crate performs network I/O; see `imgbatch-exec` for the
//! executor and worker pool.

pub mod config;
pub mod error;
pub mod outcome;
pub mod params;
pub mod planner;

pub use crate::config::{
    parse_base_url, GenerationConfig, GenerationFlags, ImageSize, DEFAULT_BASE_URL,
    DEFAULT_MODEL, DEFAULT_REFERRER,
};
pub use crate::error::{ConfigError, PlanError};
pub use crate::outcome::{aggregate, RunResult, TaskOutcome};
pub use crate::params::{build_request, GenerationRequest, QueryFlag, Seed, SEED_RANGE};
pub use crate::planner::{plan, plan_with_rng, Plan, PlanOptions, Task};
