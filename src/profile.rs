//! Wall-clock profiling of calls.
//!
//! Wraps any callable, foreign or host, and reports the result together
//! with the elapsed time from a monotonic high-resolution clock. Wrapping
//! never changes the call's synchronous, blocking nature.

use std::time::Instant;

/// Run `f` and return `(result, elapsed_seconds)`.
pub fn profile<R>(f: impl FnOnce() -> R) -> (R, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();
    (result, elapsed)
}
