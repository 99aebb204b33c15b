//! Sleep coordination for tickless low-power idle.
//!
//! The idle loop calls [`TimerEngine::pre_sleep`] with its proposed idle
//! budget right before requesting hardware sleep, and
//! [`TimerEngine::post_sleep`] right after waking. Pre-sleep clamps the
//! budget so the device wakes in time for the earliest timer (or vetoes the
//! sleep outright if a timer is already overdue); post-sleep repays the
//! ticks that were skipped while the tick interrupt was silent, measured
//! against the platform's reference counter.

use crate::tick::TickSource;

use super::TimerEngine;

/// Permission to sleep, handed out by [`TimerEngine::pre_sleep`].
///
/// Carries the clamped idle budget and the reference counter value at the
/// moment sleep was approved. Consumed by [`TimerEngine::post_sleep`], which
/// makes it hard to forget the reconciliation step.
#[derive(Debug)]
#[must_use]
pub struct SleepApproval {
    idle_ticks: u32,
    reference_mark: u32,
}

impl SleepApproval {
    /// The approved idle duration in ticks: the caller's budget, possibly
    /// clamped to the earliest timer's remaining delay.
    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }
}

impl<S: TickSource, const N: usize> TimerEngine<S, N> {
    /// Ask how long the device may sleep without missing a timer.
    ///
    /// Returns `None` when a timer should already have fired but its tick
    /// notification has not been delivered yet (two idle passes can race a
    /// slow tick interrupt that way); the caller must skip the sleep so the
    /// handler gets a chance to run. Otherwise returns an approval whose
    /// budget is `requested_idle_ticks` clamped to the head timer's
    /// remaining delta.
    pub fn pre_sleep(&self, requested_idle_ticks: u32) -> Option<SleepApproval> {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);

            let mut idle_ticks = requested_idle_ticks;
            if let Some(head) = state.active {
                let expiry = state.slots[head].expiry;
                if expiry > state.ticks {
                    idle_ticks = idle_ticks.min(expiry - state.ticks);
                } else {
                    return None;
                }
            }

            let reference_mark = self.source.reference_ticks();
            // Our count keeps running while the scheduler is suspended, so it
            // may lead the reference slightly, but it must never lag it and
            // never drift far ahead - either means a reconciliation bug.
            debug_assert!(state.ticks >= reference_mark);
            debug_assert!(state.ticks - reference_mark <= S::DRIFT_TOLERANCE_TICKS);

            Some(SleepApproval {
                idle_ticks,
                reference_mark,
            })
        })
    }

    /// Repay the ticks skipped during sleep.
    ///
    /// Reads how far the reference counter advanced since the approval and
    /// steps the internal tick count and the nanosecond clock by that amount
    /// in one critical section. Nothing fires here: the next tick
    /// notification pops whatever became due during the sleep.
    pub fn post_sleep(&self, approval: SleepApproval) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);

            let after = self.source.reference_ticks();
            // The sleep must not span the reference counter's wrap point.
            debug_assert!(after >= approval.reference_mark);
            let slept = after - approval.reference_mark;

            timer_trace!("slept {} ticks", slept);
            state.step_ticks(slept);
        });
    }
}
