//! The watchdog (§5): the only concurrency concern in the whole system. The
//! core pipeline is single-threaded and never polls a clock mid-stage; this
//! module is the sole place a worker thread and a timeout appear, matching
//! §5's "keep the cancellation boundary at the public entry point."

use oloc_util::TimeoutError;
use std::time::Duration;

/// Run `work` on a detached worker thread, with an optional wall-clock
/// budget. `time_limit` of `None`, or a negative duration folded in by the
/// caller, disables monitoring entirely and calls `work` on this thread
/// directly (no thread spawn overhead for the common unbounded case).
///
/// On timeout the worker is left to run to completion on its own thread
/// (detached, never joined) — termination is best-effort per §5, since the
/// worker may be blocked on an unbounded integer power or factorial with no
/// cooperative cancellation point.
pub fn run_with_timeout<T, F>(time_limit: Option<Duration>, work: F) -> Result<T, TimeoutError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let Some(budget) = time_limit else {
        return Ok(work());
    };

    let (tx, rx) = crossbeam_channel::bounded(1);
    let handle = std::thread::Builder::new()
        .name("oloc-calculation".to_string())
        .spawn(move || {
            let result = work();
            let _ = tx.send(result);
        });

    let handle = match handle {
        Ok(h) => h,
        Err(_) => return Ok(work()),
    };

    match rx.recv_timeout(budget) {
        Ok(result) => {
            let _ = handle.join();
            Ok(result)
        }
        Err(_) => Err(TimeoutError::timeout(
            String::new(),
            Vec::new(),
            Some(budget.as_millis().to_string()),
            None,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_within_budget() {
        let result = run_with_timeout(Some(Duration::from_millis(200)), || 1 + 1);
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn no_budget_runs_inline() {
        let result = run_with_timeout::<i32, _>(None, || 42);
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn expiring_budget_times_out() {
        let result = run_with_timeout(Some(Duration::from_millis(10)), || {
            std::thread::sleep(Duration::from_millis(500));
            1
        });
        assert!(result.is_err());
    }
}
