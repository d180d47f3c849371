//! Exit code constants for the agentry CLI.
//!
//! - 0: Success
//! - 1: Operation failure (per-entry install failure, non-ok health, lock contention)
//! - 2: Resolution failure (unknown profile/agent, registry load error, missing hub)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Operation failure: one or more entries failed, or health is degraded.
pub const OPERATION_FAILURE: i32 = 1;

/// Resolution failure: profile/registry errors that abort the whole request.
pub const RESOLUTION_FAILURE: i32 = 2;
