/// Exit codes for CI/automation.
pub const SUCCESS: i32 = 0;
pub const RUN_FAILED: i32 = 1;
pub const CONFIG_ERROR: i32 = 2;
pub const RUNTIME_ERROR: i32 = 3;
