//! Sorted singly linked lists over the timer arena.
//!
//! Entries link to each other by slot index; a list is just a head index
//! plus the `next` chain through the arena. Keeping the active list sorted
//! by expiry is what makes the tick handler's pop-all-due step proportional
//! to the number of newly due entries instead of the total timer count -
//! it runs at interrupt priority and must not have unbounded latency.

use crate::tick::TickSource;

use super::entry::TimerSlot;

/// Insert `index` keeping the list sorted by non-decreasing expiry.
///
/// The scan stops at the first entry with a strictly greater expiry, so an
/// entry lands after all entries with equal expiry: timers that become due
/// on the same tick fire in the order they were inserted.
pub(crate) fn insert_sorted<S: TickSource, const N: usize>(
    slots: &mut [TimerSlot<S, N>],
    head: &mut Option<usize>,
    index: usize,
) {
    let expiry = slots[index].expiry;

    let mut prev: Option<usize> = None;
    let mut cur = *head;
    while let Some(c) = cur {
        if expiry < slots[c].expiry {
            break;
        }
        prev = Some(c);
        cur = slots[c].next;
    }

    slots[index].next = cur;
    match prev {
        None => *head = Some(index),
        Some(p) => slots[p].next = Some(index),
    }
}

/// Unlink `index` from the list if present. Returns whether it was found.
pub(crate) fn remove<S: TickSource, const N: usize>(
    slots: &mut [TimerSlot<S, N>],
    head: &mut Option<usize>,
    index: usize,
) -> bool {
    let mut prev: Option<usize> = None;
    let mut cur = *head;
    while let Some(c) = cur {
        if c == index {
            let next = slots[c].next;
            match prev {
                None => *head = next,
                Some(p) => slots[p].next = next,
            }
            slots[c].next = None;
            return true;
        }
        prev = Some(c);
        cur = slots[c].next;
    }
    false
}

/// Whether `index` is a member of the list.
pub(crate) fn contains<S: TickSource, const N: usize>(
    slots: &[TimerSlot<S, N>],
    head: Option<usize>,
    index: usize,
) -> bool {
    let mut cur = head;
    while let Some(c) = cur {
        if c == index {
            return true;
        }
        cur = slots[c].next;
    }
    false
}

/// Wraparound merge: zero every expiry on the active list and splice the
/// overflow list onto its tail.
///
/// After a counter wrap every active entry is past due, so they all become
/// ties at expiry 0, and the overflow entries (whose expiries are valid in
/// the new numbering space, all >= 0) follow them in already-sorted order.
pub(crate) fn merge_after_wrap<S: TickSource, const N: usize>(
    slots: &mut [TimerSlot<S, N>],
    active: &mut Option<usize>,
    overflow: &mut Option<usize>,
) {
    let mut tail: Option<usize> = None;
    let mut cur = *active;
    while let Some(c) = cur {
        slots[c].expiry = 0;
        tail = cur;
        cur = slots[c].next;
    }
    match tail {
        None => *active = *overflow,
        Some(t) => slots[t].next = *overflow,
    }
    *overflow = None;
}
