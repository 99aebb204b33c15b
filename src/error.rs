//! Error types for timer operations.
//!
//! The `TimerError` enum covers the few failure conditions the engine can
//! report at runtime. Programming errors (starting an already-active timer)
//! are debug assertions instead, matching the no-heap embedded style where
//! the caller owns correctness.

use core::fmt;

/// Timer error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// All timer slots in the engine's arena are in use
    CapacityExceeded,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::CapacityExceeded => write!(f, "Timer capacity exceeded"),
        }
    }
}
