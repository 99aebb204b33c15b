//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use tick_timer::{TickSource, TimerEngine};

/// Callbacks run at or after their expected tick, never before. The
/// allowance covers the gap between recording an expected time and the next
/// tick actually arriving.
pub const TOLERANCE_TICKS: u32 = 2;

/// Deliver `n` tick interrupts: the reference counter and the engine's tick
/// handler advance together, the way a tick ISR drives both on hardware.
pub fn run_ticks<S: TickSource, const N: usize>(
    engine: &TimerEngine<S, N>,
    reference: &AtomicU32,
    n: u32,
) {
    for _ in 0..n {
        reference.fetch_add(1, Ordering::Relaxed);
        engine.handle_tick();
    }
}

/// Route `--features trace` diagnostics into the captured test output.
pub fn init_trace() {
    let _ = env_logger::builder().is_test(true).try_init();
}
