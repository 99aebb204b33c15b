//! Tick source abstraction for platform-agnostic time keeping.
//!
//! The `TickSource` trait is the boundary between the timer engine and the
//! platform's time base (SysTick, an RTOS tick hook, a test harness, ...).
//! The platform delivers one [`TimerEngine::handle_tick`] call per tick
//! interrupt; this trait supplies the numbers the engine needs around that:
//! the tick rate and an independent reference counter used to reconcile
//! ticks skipped during low-power sleep.
//!
//! [`TimerEngine::handle_tick`]: crate::TimerEngine::handle_tick

/// Platform time base trait.
///
/// Implementations describe a fixed-rate tick interrupt. The engine keeps its
/// own tick count (incremented on every `handle_tick`); the reference counter
/// exists so that multi-tick gaps - a scheduler that stops counting while
/// suspended, or a sleep that silences the tick interrupt entirely - can be
/// measured and repaid after the fact.
pub trait TickSource {
    /// Tick interrupt rate in Hz. Must be non-zero.
    const TICK_HZ: u32;

    /// How many ticks the engine's count may lead the reference counter
    /// before sleep coordination treats the gap as a drift bug.
    ///
    /// The engine's count can run slightly ahead (ticks delivered while the
    /// reference was suspended land in the reference later), but sustained
    /// divergence means a missed reconciliation.
    const DRIFT_TOLERANCE_TICKS: u32 = 3;

    /// Read the reference tick counter.
    ///
    /// Must count monotonically at `TICK_HZ` while the system runs, must
    /// *not* advance while scheduling is suspended, and must jump forward by
    /// the slept amount after a wake from sleep. Callable from any context.
    fn reference_ticks(&self) -> u32;
}
