//! Timer engine orchestration and the tick handler.
//!
//! The `TimerEngine` owns a fixed-capacity arena of timer entries and two
//! index-linked lists over it: the sorted active list and the overflow list
//! for entries due after the next tick counter wrap. All shared state sits
//! behind a single critical section, the only mutual exclusion this crate
//! uses - every public operation is callable from both task and interrupt
//! context and runs to completion without blocking.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use crate::error::TimerError;
use crate::tick::TickSource;
use crate::time;

// Sub-modules
pub mod entry;
mod list;
#[cfg(feature = "sleep")]
pub mod sleep;

// Re-export key types
pub use entry::{Restart, Timer, TimerFn};

use entry::TimerSlot;

/// Shared mutable state: the slot arena, both lists and the time counters.
///
/// Only ever touched inside a critical section.
struct EngineState<S: TickSource, const N: usize> {
    slots: heapless::Vec<TimerSlot<S, N>, N>,

    /// Head of the active list, sorted by non-decreasing expiry.
    active: Option<usize>,

    /// Head of the overflow list: entries whose expiry is only reachable
    /// after the next counter wrap.
    overflow: Option<usize>,

    /// Internal tick count. Increments once per tick notification and jumps
    /// forward during sleep reconciliation.
    ticks: u32,

    /// Time since boot. Unlike the tick count, this takes centuries to wrap.
    elapsed_ns: u64,
}

impl<S: TickSource, const N: usize> EngineState<S, N> {
    const NS_PER_TICK: u64 = time::ns_per_tick(S::TICK_HZ);

    const fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
            active: None,
            overflow: None,
            ticks: 0,
            elapsed_ns: 0,
        }
    }

    fn is_linked(&self, index: usize) -> bool {
        list::contains(&self.slots, self.active, index)
            || list::contains(&self.slots, self.overflow, index)
    }

    /// Put `index` on the list matching its expiry, `delay_ticks` from now.
    fn insert(&mut self, index: usize, mut delay_ticks: u32) {
        debug_assert!(!self.is_linked(index), "timer already active");

        // An instantaneous request expires on the next tick boundary, never
        // the current one.
        if delay_ticks == 0 {
            delay_ticks = 1;
        }
        let expiry = self.ticks.wrapping_add(delay_ticks);
        self.slots[index].expiry = expiry;

        // With the one-tick minimum, the expiry can only compare <= the
        // current count when the addition wrapped past the counter maximum.
        let head = if expiry > self.ticks {
            &mut self.active
        } else {
            &mut self.overflow
        };
        list::insert_sorted(&mut self.slots, head, index);
    }

    fn remove(&mut self, index: usize) -> bool {
        list::remove(&mut self.slots, &mut self.active, index)
            || list::remove(&mut self.slots, &mut self.overflow, index)
    }

    /// One tick elapsed: bump the counters and handle counter wrap.
    fn advance_tick(&mut self) {
        let last = self.ticks;
        self.ticks = last.wrapping_add(1);
        self.elapsed_ns += Self::NS_PER_TICK;

        if self.ticks < last {
            // Counter wrapped: everything still on the active list is past
            // due in the new numbering space, and the overflow entries are
            // now reachable.
            timer_trace!("tick count wrapped, merging overflow list");
            list::merge_after_wrap(&mut self.slots, &mut self.active, &mut self.overflow);
        }
    }

    /// Advance the counters by `slept` ticks in one step, without firing.
    #[cfg(feature = "sleep")]
    fn step_ticks(&mut self, slept: u32) {
        self.ticks = self.ticks.wrapping_add(slept);
        self.elapsed_ns += u64::from(slept) * Self::NS_PER_TICK;
    }

    /// Detach and return the head of the active list if it is due.
    fn pop_due(&mut self) -> Option<(Timer, TimerFn<S, N>, usize)> {
        let head = self.active?;
        if self.ticks < self.slots[head].expiry {
            // The sort invariant guarantees nothing further down is due.
            return None;
        }
        let next = self.slots[head].next;
        self.active = next;
        let slot = &mut self.slots[head];
        slot.next = None;
        Some((Timer::new(head), slot.func, slot.arg))
    }
}

/// Software timer engine.
///
/// Generic over:
/// - `S`: the platform [`TickSource`]
/// - `N`: the arena capacity (maximum number of distinct timers)
///
/// Construction is `const`, so the usual deployment is one engine in a
/// `static` shared between the tick interrupt, the idle loop and task code.
/// Tests can instantiate as many independent engines as they like.
pub struct TimerEngine<S: TickSource, const N: usize> {
    state: Mutex<RefCell<EngineState<S, N>>>,

    /// Reference time base, consulted by the sleep coordinator.
    #[cfg_attr(not(feature = "sleep"), allow(dead_code))]
    source: S,
}

impl<S: TickSource, const N: usize> TimerEngine<S, N> {
    /// Create an engine with an empty arena.
    pub const fn new(source: S) -> Self {
        Self {
            state: Mutex::new(RefCell::new(EngineState::new())),
            source,
        }
    }

    /// Register a timer with its callback and an opaque argument.
    ///
    /// The slot is claimed for the engine's lifetime; the returned handle is
    /// what `start`/`cancel`/`is_active` operate on. Fails once all `N`
    /// slots are taken.
    pub fn create(&self, func: TimerFn<S, N>, arg: usize) -> Result<Timer, TimerError> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let index = state.slots.len();
            state
                .slots
                .push(TimerSlot::new(func, arg))
                .map_err(|_| TimerError::CapacityExceeded)?;
            Ok(Timer::new(index))
        })
    }

    /// Start a timer so its callback runs once `delay_ms` has elapsed.
    ///
    /// The delay converts to ticks rounding up, plus one alignment tick, so
    /// the callback never runs earlier than requested; a zero delay fires on
    /// the next tick boundary. Starting a timer that is already active is a
    /// programming error (debug assertion).
    pub fn start(&self, timer: Timer, delay_ms: u32) {
        debug_assert!(!self.is_active(timer), "timer already active");

        let delay_ticks = time::delay_ticks_from_ms(delay_ms, S::TICK_HZ);
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).insert(timer.index(), delay_ticks);
        });
    }

    /// Cancel a timer.
    ///
    /// Returns `true` if the timer was active and has been removed; its
    /// callback will not run for that scheduling. Returns `false` if it was
    /// not active (already fired, never started, or cancelled before).
    pub fn cancel(&self, timer: Timer) -> bool {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).remove(timer.index()))
    }

    /// Whether the timer is active (started and not yet fired or cancelled).
    pub fn is_active(&self, timer: Timer) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).is_linked(timer.index()))
    }

    /// Current internal tick count.
    pub fn ticks(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).ticks)
    }

    /// Time since boot in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        critical_section::with(|cs| self.state.borrow_ref(cs).elapsed_ns)
    }

    /// Time since boot in milliseconds.
    pub fn time_ms(&self) -> u64 {
        self.time_ns() / time::NS_PER_MS
    }

    /// Process one tick notification. Call once per tick interrupt, from the
    /// tick interrupt only.
    ///
    /// Advances the tick count, merges the overflow list on counter wrap,
    /// then pops and runs every entry that has become due. Each entry is
    /// detached before its callback executes, so a callback may start or
    /// cancel any timer - including the one firing - without corrupting the
    /// traversal. A `Restart::AfterMs` return re-inserts the entry under the
    /// same critical section that fetches the next due entry; the re-insert
    /// is tick-aligned and therefore skips the alignment tick `start` adds.
    pub fn handle_tick(&self) {
        let mut due = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.advance_tick();
            state.pop_due()
        });

        while let Some((timer, func, arg)) = due {
            timer_trace!("tick: running timer {}", timer.index());
            let restart = func(self, timer, arg);

            due = critical_section::with(|cs| {
                let mut state = self.state.borrow_ref_mut(cs);
                if let Restart::AfterMs(ms) = restart {
                    state.insert(timer.index(), time::ticks_from_ms(ms, S::TICK_HZ));
                }
                state.pop_due()
            });
        }
    }
}

impl<S: TickSource, const N: usize> fmt::Debug for TimerEngine<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;

    struct TestTicks;

    impl TickSource for TestTicks {
        const TICK_HZ: u32 = 1000;

        fn reference_ticks(&self) -> u32 {
            0
        }
    }

    type TestEngine = TimerEngine<TestTicks, 4>;

    fn with_state<R>(engine: &TestEngine, f: impl FnOnce(&mut EngineState<TestTicks, 4>) -> R) -> R {
        critical_section::with(|cs| f(&mut engine.state.borrow_ref_mut(cs)))
    }

    fn noop(_: &TestEngine, _: Timer, _: usize) -> Restart {
        Restart::Off
    }

    fn run_ticks(engine: &TestEngine, n: u32) {
        for _ in 0..n {
            engine.handle_tick();
        }
    }

    #[test]
    fn test_insert_splits_across_wrap() {
        let engine = TestEngine::new(TestTicks);
        with_state(&engine, |state| state.ticks = u32::MAX - 10);

        let near = engine.create(noop, 0).unwrap();
        let far = engine.create(noop, 0).unwrap();

        // expiry MAX - 4: stays on this side of the wrap
        engine.start(near, 5);
        // expiry wraps: parked on the overflow list
        engine.start(far, 100);

        with_state(&engine, |state| {
            assert_eq!(state.active, Some(near.index()));
            assert_eq!(state.overflow, Some(far.index()));
            assert_eq!(state.slots[near.index()].expiry, u32::MAX - 4);
            assert_eq!(
                state.slots[far.index()].expiry,
                (u32::MAX - 10u32).wrapping_add(101)
            );
        });
        assert!(engine.is_active(near));
        assert!(engine.is_active(far));
    }

    #[test]
    fn test_firing_order_across_wrap() {
        static FIRST: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
        static SECOND: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);

        fn record(engine: &TestEngine, _timer: Timer, arg: usize) -> Restart {
            let slot = if arg == 0 { &FIRST } else { &SECOND };
            slot.store(engine.ticks(), std::sync::atomic::Ordering::Relaxed);
            Restart::Off
        }

        let engine = TestEngine::new(TestTicks);
        with_state(&engine, |state| state.ticks = u32::MAX - 10);
        let start = engine.ticks();

        let near = engine.create(record, 0).unwrap();
        let far = engine.create(record, 1).unwrap();
        engine.start(near, 5);
        engine.start(far, 30);

        run_ticks(&engine, 40);

        assert!(!engine.is_active(near));
        assert!(!engine.is_active(far));
        let first = FIRST.load(std::sync::atomic::Ordering::Relaxed);
        let second = SECOND.load(std::sync::atomic::Ordering::Relaxed);
        // both fire exactly on their absolute expiry, straddling the wrap
        assert_eq!(first, start.wrapping_add(6));
        assert_eq!(second, start.wrapping_add(31));
        assert!(second < first, "second firing is on the far side of the wrap");
    }

    #[test]
    fn test_zero_delay_fires_on_next_tick() {
        static FIRED_AT: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(u32::MAX);

        fn record(engine: &TestEngine, _timer: Timer, _arg: usize) -> Restart {
            FIRED_AT.store(engine.ticks(), std::sync::atomic::Ordering::Relaxed);
            Restart::Off
        }

        let engine = TestEngine::new(TestTicks);
        let timer = engine.create(record, 0).unwrap();
        engine.start(timer, 0);

        engine.handle_tick();
        assert_eq!(FIRED_AT.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn test_restart_never_fires_twice_in_one_tick() {
        static COUNT: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);

        fn repeat(_engine: &TestEngine, _timer: Timer, _arg: usize) -> Restart {
            COUNT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            // rounds to zero ticks; must still make one tick of progress
            Restart::AfterMs(0)
        }

        let engine = TestEngine::new(TestTicks);
        let timer = engine.create(repeat, 0).unwrap();
        engine.start(timer, 0);

        run_ticks(&engine, 5);
        // exactly one firing per tick - the re-insert makes monotonic progress
        assert_eq!(COUNT.load(std::sync::atomic::Ordering::Relaxed), 5);
        assert!(engine.is_active(timer));
    }

    #[test]
    fn test_create_capacity() {
        let engine = TestEngine::new(TestTicks);
        for _ in 0..4 {
            engine.create(noop, 0).unwrap();
        }
        assert_eq!(engine.create(noop, 0), Err(TimerError::CapacityExceeded));
    }

    #[test]
    #[should_panic(expected = "timer already active")]
    fn test_start_while_active_asserts() {
        let engine = TestEngine::new(TestTicks);
        let timer = engine.create(noop, 0).unwrap();
        engine.start(timer, 10);
        engine.start(timer, 10);
    }

    #[test]
    fn test_time_accounting() {
        let engine = TestEngine::new(TestTicks);
        run_ticks(&engine, 25);
        assert_eq!(engine.ticks(), 25);
        assert_eq!(engine.time_ns(), 25_000_000);
        assert_eq!(engine.time_ms(), 25);
    }
}
