//! Test fixtures and utilities for tick-timer testing.
//!
//! Provides:
//! - `MockTicks`: Test implementation of the TickSource trait
//! - `TestEngine`: engine type sized for the integration scenarios

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use tick_timer::TickSource;

/// Mock tick source for testing.
///
/// Wraps a static counter the test advances by hand. It plays the role of
/// the RTOS tick count: it does not move while "scheduling is suspended"
/// (i.e. unless the test moves it) and jumps forward after a simulated
/// sleep.
pub struct MockTicks {
    count: &'static AtomicU32,
}

impl MockTicks {
    /// Create a mock source reading from the given counter.
    pub const fn new(count: &'static AtomicU32) -> Self {
        Self { count }
    }
}

impl TickSource for MockTicks {
    // 1 tick == 1 ms keeps the scenario arithmetic readable
    const TICK_HZ: u32 = 1000;

    fn reference_ticks(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Arena capacity used by the integration scenarios.
pub const TEST_TIMERS: usize = 8;

/// Engine type shared by the integration scenarios.
pub type TestEngine = tick_timer::TimerEngine<MockTicks, TEST_TIMERS>;
