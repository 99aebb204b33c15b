//! # tick-timer
//!
//! Tick-driven software timers for embedded systems with zero heap allocation.
//!
//! **Key features:**
//! - **Static allocation** - Fixed-capacity timer arena, zero heap usage
//! - **Interrupt-safe** - All operations serialize through one critical section
//! - **Wraparound-correct** - Expiries survive tick counter overflow
//! - **Sleep-aware** - Idle budget clamping and post-wake tick reconciliation
//! - **Self-restarting callbacks** - Periodic timers without re-arm races
//!
//! Timers are created once against a [`TimerEngine`] and then started,
//! cancelled and restarted through a small `Copy` handle. The engine is
//! driven by one [`TimerEngine::handle_tick`] call per tick interrupt and
//! never fires a callback earlier than the requested delay.
//!
//! ## Optional Features
//!
//! - `sleep` *(default)* - Sleep coordination for tickless low-power idle
//! - `trace` - Routes list and tick diagnostics through `log::trace!`
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// Optional dependencies (feature-gated)
#[cfg(feature = "trace")]
extern crate log;

// Trace diagnostics compile to nothing unless the `trace` feature is on.
#[cfg(feature = "trace")]
macro_rules! timer_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}
#[cfg(not(feature = "trace"))]
macro_rules! timer_trace {
    ($($arg:tt)*) => {{}};
}

// ============================================================================
// Module Declarations
// ============================================================================

// Platform boundary
pub mod tick;

// Time base conversions
pub mod time;

// Error handling
pub mod error;

// Timer engine core
pub mod timer;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Platform boundary
pub use tick::TickSource;

// Error types
pub use error::TimerError;

// Engine and entry types
pub use timer::{Restart, Timer, TimerEngine, TimerFn};

// Sleep coordination (sleep-only types)
#[cfg(feature = "sleep")]
pub use timer::sleep::SleepApproval;

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
