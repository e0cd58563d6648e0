use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{LazyLock, Mutex, PoisonError},
};

///
/// EventState
/// Ephemeral, in-memory counters for table and entity operations. One
/// state per process, shared by every thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub classes: BTreeMap<String, ClassCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Property access
    pub property_reads: u64,
    pub property_writes: u64,
    pub rejected_writes: u64,

    // Semantic lookups that resolved to nothing
    pub semantic_read_misses: u64,
    pub semantic_write_misses: u64,

    // Implicit tile views built
    pub implicit_views: u64,
}

///
/// ClassCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ClassCounters {
    pub property_reads: u64,
    pub property_writes: u64,
    pub rejected_writes: u64,
    pub semantic_misses: u64,
    pub implicit_views: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    let state = EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner);

    f(&state)
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    let mut state = EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner);

    f(&mut state)
}

/// Counters for `class`, created on first use.
pub(crate) fn class_entry<'a>(m: &'a mut EventState, class: &str) -> &'a mut ClassCounters {
    m.classes.entry(class.to_string()).or_default()
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,

    /// Per-class counters, busiest class first.
    pub class_counters: Vec<(String, ClassCounters)>,
}

/// Build a report from the in-memory counters.
#[must_use]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut class_counters: Vec<(String, ClassCounters)> = snap.classes.into_iter().collect();
    class_counters.sort_by(|(a_id, a), (b_id, b)| {
        let a_total = a.property_reads.saturating_add(a.property_writes);
        let b_total = b.property_reads.saturating_add(b.property_writes);

        b_total.cmp(&a_total).then_with(|| a_id.cmp(b_id))
    });

    EventReport {
        ops: snap.ops,
        class_counters,
    }
}
