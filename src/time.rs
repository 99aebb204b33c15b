//! Conversions between milliseconds, ticks and nanoseconds.
//!
//! All delay conversions round up so that a converted delay never represents
//! less real time than was asked for.

/// Nanoseconds per millisecond.
pub const NS_PER_MS: u64 = 1_000_000;

const MS_PER_SEC: u64 = 1000;
const NS_PER_SEC: u64 = 1_000_000_000;

/// Convert milliseconds to ticks, rounding up.
pub const fn ticks_from_ms(ms: u32, tick_hz: u32) -> u32 {
    let ticks = (ms as u64 * tick_hz as u64 + (MS_PER_SEC - 1)) / MS_PER_SEC;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Convert a requested start delay to ticks: ceiling conversion plus one
/// alignment tick.
///
/// A start issued between tick boundaries is up to one tick period closer to
/// the next tick than the raw conversion assumes; the extra tick guarantees
/// the real elapsed time is never less than requested. Restarts issued from
/// inside the tick handler are already tick-aligned and use
/// [`ticks_from_ms`] directly.
pub const fn delay_ticks_from_ms(ms: u32, tick_hz: u32) -> u32 {
    ticks_from_ms(ms, tick_hz).saturating_add(1)
}

/// Convert ticks to milliseconds, truncating.
pub const fn ms_from_ticks(ticks: u32, tick_hz: u32) -> u64 {
    ticks as u64 * MS_PER_SEC / tick_hz as u64
}

/// Nanoseconds represented by one tick.
pub const fn ns_per_tick(tick_hz: u32) -> u64 {
    NS_PER_SEC / tick_hz as u64
}
