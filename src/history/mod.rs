//! Linear undo/redo over whole-workspace snapshots.

pub(crate) mod lineage;

use crate::widget::Snapshot;
use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Default number of snapshots kept before the oldest are dropped.
pub(crate) const DEFAULT_CAPACITY: usize = 50;

/// One committed snapshot and the moment it was pushed.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) snapshot: Snapshot,
    pub(crate) committed_at: DateTime<Local>,
}

/// The undo history of the editor.
#[derive(Clone, Debug)]
pub(crate) struct History {
    /// Snapshots in commit order, oldest at the front.
    ///
    /// **Invariant**: never empty.
    entries: VecDeque<Entry>,
    /// Index of the snapshot currently shown. Undo decrements it, redo
    /// increments it.
    ///
    /// **Invariant**: `index < entries.len()`
    index: usize,
    /// Maximum number of snapshots retained, at least 1.
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::default(), DEFAULT_CAPACITY)
    }
}

impl History {
    /// Creates a history holding only `initial`.
    pub fn new(initial: Snapshot, capacity: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(Entry {
            snapshot: initial,
            committed_at: Local::now(),
        });
        Self {
            entries,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Commits `snapshot` as the new current state.
    ///
    /// Anything ahead of the current index is discarded first, then the
    /// oldest snapshots are evicted until the capacity holds again.
    pub fn push(&mut self, snapshot: Snapshot) {
        let discarded = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);
        self.entries.push_back(Entry {
            snapshot,
            committed_at: Local::now(),
        });

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.index = self.entries.len() - 1;

        if discarded > 0 || evicted > 0 {
            log::debug!(
                "history push dropped {discarded} redo and {evicted} oldest snapshot(s)"
            );
        }
    }

    /// Steps back one snapshot, returning it, or `None` at the oldest one.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Steps forward one snapshot, returning it, or `None` at the newest one.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index].snapshot
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All retained entries, oldest first, including any redo tail.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Changes the capacity, evicting the oldest snapshots if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            // Drop redo entries before ones the user can still undo to.
            if self.index + 1 < self.entries.len() {
                self.entries.pop_back();
            } else {
                self.entries.pop_front();
                self.index -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{File, Snapshot};

    /// A snapshot distinguishable by its single file's name.
    fn snap(name: &str) -> Snapshot {
        Snapshot::new(vec![File {
            name: name.into(),
            ..File::default()
        }])
        .unwrap()
    }

    fn name(s: &Snapshot) -> &str {
        &s.files()[0].name
    }

    #[test]
    fn test_starts_with_initial_snapshot() {
        let mut history = History::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current(), &Snapshot::default());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.current(), &Snapshot::default());
    }

    #[test]
    fn test_undo_after_two_pushes() {
        let mut history = History::new(snap("initial"), 50);
        history.push(snap("p1"));
        history.push(snap("p2"));
        assert_eq!(history.undo().map(name), Some("p1"));
        assert_eq!(name(history.current()), "p1");
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new(snap("initial"), 50);
        let n = 7;
        for i in 1..=n {
            history.push(snap(&format!("p{i}")));
        }
        for _ in 0..n {
            assert!(history.undo().is_some());
        }
        assert_eq!(name(history.current()), "initial");
        assert!(history.undo().is_none());
        for _ in 0..n {
            assert!(history.redo().is_some());
        }
        assert_eq!(name(history.current()), "p7");
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_after_undo_discards_redo() {
        let mut history = History::new(snap("initial"), 50);
        for i in 1..=5 {
            history.push(snap(&format!("p{i}")));
        }
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.push(snap("branch"));
        assert_eq!(history.len(), 5);
        assert_eq!(name(history.current()), "branch");
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.undo().map(name), Some("p3"));
    }

    #[test]
    fn test_capacity_exact_boundary() {
        let capacity = 50;
        let mut history = History::new(snap("initial"), capacity);
        for i in 1..capacity {
            history.push(snap(&format!("p{i}")));
        }
        assert_eq!(history.len(), capacity);
        assert_eq!(history.index(), capacity - 1);

        // capacity + 1 snapshots pushed in total: the initial one goes.
        history.push(snap("overflow"));
        assert_eq!(history.len(), capacity);
        assert_eq!(history.index(), capacity - 1);
        assert_eq!(name(history.current()), "overflow");

        let mut steps = 0;
        while history.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, capacity - 1);
        assert_eq!(name(history.current()), "p1");
    }

    #[test]
    fn test_capacity_plus_five() {
        let mut history = History::new(snap("initial"), DEFAULT_CAPACITY);
        for i in 0..DEFAULT_CAPACITY + 5 {
            history.push(snap(&format!("p{i}")));
        }
        assert_eq!(history.len(), DEFAULT_CAPACITY);
        assert_eq!(
            name(history.current()),
            format!("p{}", DEFAULT_CAPACITY + 4)
        );
        assert!(!history.can_redo());
    }

    #[test]
    fn test_eviction_after_undo() {
        let mut history = History::new(snap("initial"), 3);
        history.push(snap("p1"));
        history.push(snap("p2"));
        history.undo();
        history.undo();
        // index 0, pushing drops p1/p2 then appends: no eviction needed
        history.push(snap("p3"));
        assert_eq!(history.len(), 2);
        history.push(snap("p4"));
        history.push(snap("p5"));
        assert_eq!(history.len(), 3);
        let names: Vec<&str> = history.entries().map(|e| name(&e.snapshot)).collect();
        assert_eq!(names, vec!["p3", "p4", "p5"]);
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn test_capacity_of_one() {
        let mut history = History::new(snap("initial"), 0);
        assert_eq!(history.capacity(), 1);
        history.push(snap("p1"));
        assert_eq!(history.len(), 1);
        assert_eq!(name(history.current()), "p1");
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_shrinking_capacity_keeps_current() {
        let mut history = History::new(snap("initial"), 10);
        for i in 1..=6 {
            history.push(snap(&format!("p{i}")));
        }
        history.undo();
        history.undo();
        assert_eq!(name(history.current()), "p4");

        history.set_capacity(3);
        assert_eq!(history.len(), 3);
        assert_eq!(name(history.current()), "p4");
        let names: Vec<&str> = history.entries().map(|e| name(&e.snapshot)).collect();
        assert_eq!(names, vec!["p2", "p3", "p4"]);
    }
}
