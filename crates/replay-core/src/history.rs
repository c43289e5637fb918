//! Snapshot undo/redo stack.
//!
//! A linear history of immutable [`Snapshot`]s with a cursor. Pushing an edit truncates any
//! redo tail; undo and redo only move the cursor and report the [`Transition`] a live runtime
//! has to replay.
//!
//! Consecutive coalescing pushes form an open group and merge into a single snapshot, so a burst
//! of recorded keystrokes undoes as one step. The group closes on [`SnapshotStack::end_group`],
//! undo, redo, [`SnapshotStack::mark_clean`], or a non-coalescing push.

use crate::edit::Edit;
use crate::effect::Effect;
use crate::event::Direction;
use crate::session::Snapshot;
use std::sync::Arc;

/// A move between two adjacent snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Snapshot the runtime currently reflects.
    pub from: Arc<Snapshot>,
    /// Snapshot the runtime has to reach.
    pub to: Arc<Snapshot>,
    /// `Forward` for new edits and redo, `Backward` for undo.
    pub direction: Direction,
    /// Effects crossed, in stored order. Replay them in reverse when going backward.
    pub effects: Vec<Effect>,
}

/// Linear undo/redo history over session snapshots.
#[derive(Debug)]
pub struct SnapshotStack {
    snapshots: Vec<Arc<Snapshot>>,
    index: usize,
    max_history: usize,
    /// Index of the snapshot matching persisted state. `None` once that snapshot is gone.
    clean_index: Option<usize>,
    group_open: bool,
}

impl SnapshotStack {
    /// Default number of snapshots kept.
    pub const DEFAULT_MAX_HISTORY: usize = 1000;

    /// Create a stack holding only `initial`, which is treated as clean.
    pub fn new(initial: Snapshot) -> Self {
        Self::with_max_history(initial, Self::DEFAULT_MAX_HISTORY)
    }

    /// Create a stack keeping at most `max_history` snapshots (at least 1).
    pub fn with_max_history(initial: Snapshot, max_history: usize) -> Self {
        Self {
            snapshots: vec![Arc::new(initial)],
            index: 0,
            max_history: max_history.max(1),
            clean_index: Some(0),
            group_open: false,
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.snapshots[self.index]
    }

    /// Position of the current snapshot.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots, including the redo tail.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`: the stack holds at least one snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[Arc<Snapshot>] {
        &self.snapshots
    }

    /// Returns `true` if [`undo`](Self::undo) would move.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Returns `true` if [`redo`](Self::redo) would move.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.index
    }

    /// Number of redo steps available.
    pub fn redo_depth(&self) -> usize {
        self.snapshots.len() - self.index - 1
    }

    /// Returns `true` if a coalescing group is open.
    pub fn is_group_open(&self) -> bool {
        self.group_open
    }

    /// Returns `true` if the current snapshot is the one last marked clean.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.index)
    }

    /// Mark the current snapshot as matching persisted state.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.index);
        self.end_group();
    }

    /// Close the open coalescing group.
    pub fn end_group(&mut self) {
        self.group_open = false;
    }

    fn truncate_redo(&mut self) {
        if !self.can_redo() {
            return;
        }
        // A clean point in the redo tail becomes unreachable.
        if let Some(clean) = self.clean_index
            && clean > self.index
        {
            self.clean_index = None;
        }
        self.snapshots.truncate(self.index + 1);
    }

    /// Push the result of an edit on top of the current snapshot.
    ///
    /// With `coalescing`, the edit merges into the current snapshot (effects concatenated) when a
    /// group is open and the current snapshot is neither the stack floor nor the clean point.
    /// Returns the transition a live runtime replays to follow the edit.
    pub fn push_edit(&mut self, edit: Edit, coalescing: bool) -> Transition {
        self.truncate_redo();
        let from = Arc::clone(self.current());
        let Edit { patch, effects } = edit;

        let merge_into_top =
            coalescing && self.group_open && self.index > 0 && !self.is_clean();

        let to = if merge_into_top {
            let mut merged = from.effects.clone();
            merged.extend(effects.iter().cloned());
            let snapshot = Arc::new(patch.apply(&from, merged));
            self.snapshots[self.index] = Arc::clone(&snapshot);
            snapshot
        } else {
            let snapshot = Arc::new(patch.apply(&from, effects.clone()));
            self.snapshots.push(Arc::clone(&snapshot));
            self.index += 1;
            self.enforce_max_history();
            snapshot
        };
        self.group_open = coalescing;

        tracing::trace!(
            index = self.index,
            merged = merge_into_top,
            effects = effects.len(),
            "pushed edit"
        );

        Transition {
            from,
            to,
            direction: Direction::Forward,
            effects,
        }
    }

    fn enforce_max_history(&mut self) {
        while self.snapshots.len() > self.max_history {
            self.snapshots.remove(0);
            self.index -= 1;
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(clean) => Some(clean - 1),
            };
        }
    }

    /// Move back one snapshot. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<Transition> {
        if !self.can_undo() {
            return None;
        }
        self.end_group();
        let from = Arc::clone(self.current());
        self.index -= 1;
        let to = Arc::clone(self.current());
        Some(Transition {
            effects: from.effects.clone(),
            from,
            to,
            direction: Direction::Backward,
        })
    }

    /// Move forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<Transition> {
        if !self.can_redo() {
            return None;
        }
        self.end_group();
        let from = Arc::clone(self.current());
        self.index += 1;
        let to = Arc::clone(self.current());
        Some(Transition {
            effects: to.effects.clone(),
            from,
            to,
            direction: Direction::Forward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::BodyPatch;

    fn duration_edit(duration: f64) -> Edit {
        Edit {
            patch: BodyPatch {
                duration: Some(duration),
                ..BodyPatch::default()
            },
            effects: Vec::new(),
        }
    }

    #[test]
    fn test_max_history_drops_oldest() {
        let mut stack = SnapshotStack::with_max_history(Snapshot::default(), 3);
        for d in 1..=5 {
            stack.push_edit(duration_edit(d as f64), false);
        }
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.snapshots()[0].duration(), 3.0);
        assert_eq!(stack.current().duration(), 5.0);
        assert!(!stack.is_clean());
    }

    #[test]
    fn test_coalescing_skips_initial_snapshot() {
        let mut stack = SnapshotStack::new(Snapshot::default());
        stack.push_edit(duration_edit(1.0), true);
        assert_eq!(stack.len(), 2);
        stack.push_edit(duration_edit(2.0), true);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current().duration(), 2.0);
    }
}
