//! Filesystem operations for agentry.

pub mod atomic;
pub mod timed;

pub use atomic::atomic_write;
pub use timed::{run_with_timeout, run_with_timeout_retries};
