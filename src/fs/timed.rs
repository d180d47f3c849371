//! Bounded filesystem operations.
//!
//! No deployment step may block indefinitely: a hung network mount or stuck
//! symlink resolution must surface as a per-entry `Timeout` failure so the
//! batch can continue. Operations run on a worker thread and are abandoned
//! after the configured bound; the batch never waits past the timeout even
//! if the underlying syscall eventually returns.

use crate::error::{AgentryError, Result};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run a filesystem operation with a bounded timeout.
///
/// The operation runs on a spawned thread. If it does not complete within
/// `timeout`, `Err(AgentryError::Timeout)` is returned and the thread is
/// detached (a timed-out rename may still land later; callers re-check state
/// on retry).
///
/// # Arguments
///
/// * `label` - Short description used in the timeout error message
/// * `timeout` - Maximum wall-clock time to wait
/// * `op` - The operation to run
pub fn run_with_timeout<T, F>(label: &str, timeout: Duration, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        // Receiver may be gone if the caller already timed out.
        let _ = tx.send(op());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(AgentryError::Timeout(format!(
            "{} did not complete within {} ms",
            label,
            timeout.as_millis()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(AgentryError::Deployment(format!(
            "{}: worker thread terminated unexpectedly",
            label
        ))),
    }
}

/// Run a bounded operation with a small retry budget.
///
/// Only timeouts are retried; any other error is returned immediately.
/// After `retries` additional attempts the final timeout is reported.
pub fn run_with_timeout_retries<T, F>(
    label: &str,
    timeout: Duration,
    retries: u32,
    op: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnMut() -> Result<T> + Send + Clone + 'static,
{
    let mut last_err = None;

    for _attempt in 0..=retries {
        let attempt_op = op.clone();
        match run_with_timeout(label, timeout, move || {
            let mut attempt_op = attempt_op;
            attempt_op()
        }) {
            Ok(value) => return Ok(value),
            Err(err @ AgentryError::Timeout(_)) => last_err = Some(err),
            Err(err) => return Err(err),
        }
    }

    // Loop runs at least once, so last_err is always set here.
    Err(last_err.unwrap_or_else(|| {
        AgentryError::Timeout(format!("{} timed out", label))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_operation_completes() {
        let result = run_with_timeout("noop", Duration::from_secs(1), || Ok(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn slow_operation_times_out() {
        let result: Result<()> = run_with_timeout("sleep", Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        });

        let err = result.unwrap_err();
        assert!(matches!(err, AgentryError::Timeout(_)));
        assert!(err.to_string().contains("sleep"));
    }

    #[test]
    fn errors_pass_through() {
        let result: Result<()> = run_with_timeout("fail", Duration::from_secs(1), || {
            Err(AgentryError::Deployment("boom".to_string()))
        });

        assert!(matches!(result.unwrap_err(), AgentryError::Deployment(_)));
    }

    #[test]
    fn retries_are_bounded() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<()> =
            run_with_timeout_retries("sleep", Duration::from_millis(10), 2, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(200));
                Ok(())
            });

        assert!(matches!(result.unwrap_err(), AgentryError::Timeout(_)));
        // 1 initial attempt + 2 retries.
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn retry_stops_on_non_timeout_error() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<()> =
            run_with_timeout_retries("fail", Duration::from_secs(1), 3, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AgentryError::Deployment("permission denied".to_string()))
            });

        assert!(matches!(result.unwrap_err(), AgentryError::Deployment(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
