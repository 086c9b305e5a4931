//! Deterministic deferred-action queue
//!
//! The page uses fixed short delays to sequence DOM replacement before a
//! source assignment, to finish opacity fades, and to scroll to deep-linked
//! items once they materialize. Instead of wall-clock timers the engine
//! keeps a logical-time queue: callers schedule a `DeferredAction` with a
//! delay, and the host advances time in discrete steps. The delays only
//! sequence work, so tests can flush the queue immediately.

/// Work scheduled to run after a short delay.
///
/// Actions carry element ids, not node handles: when an action fires the
/// engine re-checks current DOM state, so an action outlived by an unload
/// cannot resurrect a dead iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Assign a source to a freshly attached replacement iframe
    AssignIframeSource { element_id: String, src: String },
    /// Bring the incoming section to full opacity after the fade
    SetOpacity { element_id: String, value: String },
    /// Scroll to and highlight a deep-linked archive item
    ScrollToItem { element_id: String },
}

#[derive(Debug)]
struct Entry {
    due_ms: u64,
    seq: u64,
    action: DeferredAction,
}

/// Logical-time queue of deferred actions
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Schedule `action` to fire `delay_ms` from the current logical time
    pub fn schedule(&mut self, delay_ms: u64, action: DeferredAction) {
        let entry = Entry {
            due_ms: self.now_ms + delay_ms,
            seq: self.next_seq,
            action,
        };
        self.next_seq += 1;
        self.pending.push(entry);
    }

    /// Advance logical time, returning every action now due, in schedule
    /// order (due time, then insertion order for ties).
    pub fn advance(&mut self, delta_ms: u64) -> Vec<DeferredAction> {
        self.now_ms += delta_ms;
        let now = self.now_ms;
        let mut due: Vec<Entry> = Vec::new();
        let mut remaining = Vec::new();
        for entry in self.pending.drain(..) {
            if entry.due_ms <= now {
                due.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.pending = remaining;
        due.sort_by_key(|e| (e.due_ms, e.seq));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Fire everything immediately regardless of remaining delay
    pub fn flush(&mut self) -> Vec<DeferredAction> {
        let max_due = self.pending.iter().map(|e| e.due_ms).max().unwrap_or(0);
        let delta = max_due.saturating_sub(self.now_ms);
        self.advance(delta)
    }
}
