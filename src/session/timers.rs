//! Deferred one-shot events for a session

/// Handle for cancelling a single scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    epoch: u64,
    seq: u64,
}

#[derive(Debug)]
struct Entry<E> {
    due: f64,
    id: TimerId,
    event: E,
}

/// Pending events keyed by due time (ms)
///
/// Every entry is stamped with the epoch it was scheduled in. `cancel_all`
/// starts a new epoch, so handles from an older run can never cancel or fire
/// anything in the current one.
#[derive(Debug)]
pub struct Timers<E> {
    entries: Vec<Entry<E>>,
    epoch: u64,
    next_seq: u64,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            epoch: 0,
            next_seq: 0,
        }
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, event: E) -> TimerId {
        let id = TimerId {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.push(Entry { due, id, event });
        id
    }

    /// Returns true if the event was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop everything and invalidate outstanding handles
    pub fn cancel_all(&mut self) {
        self.entries.clear();
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Remove and return the earliest event due at `now`. Ties fire in
    /// scheduling order.
    pub fn pop_due(&mut self, now: f64) -> Option<E> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now && e.id.epoch == self.epoch)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.seq.cmp(&b.id.seq)))
            .map(|(i, _)| i)?;
        Some(self.entries.remove(idx).event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut t = Timers::new();
        t.schedule(300.0, "c");
        t.schedule(100.0, "a");
        t.schedule(100.0, "b");
        assert_eq!(t.pop_due(50.0), None);
        assert_eq!(t.pop_due(1000.0), Some("a"));
        assert_eq!(t.pop_due(1000.0), Some("b"));
        assert_eq!(t.pop_due(1000.0), Some("c"));
        assert!(t.is_empty());
    }

    #[test]
    fn test_cancel_single() {
        let mut t = Timers::new();
        let a = t.schedule(100.0, 1);
        t.schedule(100.0, 2);
        assert!(t.cancel(a));
        assert!(!t.cancel(a));
        assert_eq!(t.pop_due(100.0), Some(2));
    }

    #[test]
    fn test_cancel_all_invalidates_handles() {
        let mut t = Timers::new();
        let old = t.schedule(100.0, 1);
        t.cancel_all();
        assert!(t.is_empty());
        assert_eq!(t.epoch(), 1);

        let new = t.schedule(100.0, 2);
        assert_ne!(old, new);
        assert!(!t.cancel(old));
        assert!(t.is_pending(new));
        assert_eq!(t.pop_due(100.0), Some(2));
    }
}
