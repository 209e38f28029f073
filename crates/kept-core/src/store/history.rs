//! Bounded linear undo/redo log.

use std::collections::VecDeque;

use crate::models::{Note, NoteId};

/// Kind of a recorded mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

/// One reversible mutation. Snapshots are owned copies, independent of the
/// live collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// `note` was inserted at the front of the active collection
    Create { note: Note },
    /// `previous` was replaced by `note`
    Update { note: Note, previous: Note },
    /// `note` (its pre-deletion snapshot) was moved to the trash
    Delete { note: Note },
}

impl HistoryAction {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Create { .. } => ActionKind::Create,
            Self::Update { .. } => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    /// The state re-applied on redo.
    pub const fn note(&self) -> &Note {
        match self {
            Self::Create { note } | Self::Update { note, .. } | Self::Delete { note } => note,
        }
    }

    /// The state restored on undo of an update.
    pub const fn previous(&self) -> Option<&Note> {
        match self {
            Self::Update { previous, .. } => Some(previous),
            Self::Create { .. } | Self::Delete { .. } => None,
        }
    }

    pub const fn note_id(&self) -> &NoteId {
        &self.note().id
    }
}

/// Append-only action log with a movable cursor.
///
/// `applied` counts the actions currently in effect, so the conventional
/// cursor (`-1` when nothing can be undone) is `applied - 1`. Invariant:
/// `applied <= actions.len() <= capacity`.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    actions: VecDeque<HistoryAction>,
    applied: usize,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            actions: VecDeque::with_capacity(capacity),
            applied: 0,
            capacity,
        }
    }

    /// Record a fresh action.
    ///
    /// Anything past the cursor (the redo branch) is discarded first, and the
    /// oldest entries fall off once the log is over capacity.
    pub fn record(&mut self, action: HistoryAction) {
        self.actions.truncate(self.applied);
        self.actions.push_back(action);
        while self.actions.len() > self.capacity {
            self.actions.pop_front();
        }
        self.applied = self.actions.len();
    }

    pub const fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.actions.len()
    }

    /// Cursor position, `-1` meaning nothing to undo.
    #[allow(clippy::cast_possible_wrap)] // bounded by capacity
    pub const fn history_index(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Action an undo would reverse
    pub fn next_undo(&self) -> Option<&HistoryAction> {
        self.applied
            .checked_sub(1)
            .and_then(|index| self.actions.get(index))
    }

    /// Action a redo would re-apply
    pub fn next_redo(&self) -> Option<&HistoryAction> {
        self.actions.get(self.applied)
    }

    /// Move the cursor back after an undo has been applied.
    pub fn step_back(&mut self) {
        self.applied = self.applied.saturating_sub(1);
    }

    /// Move the cursor forward after a redo has been applied.
    pub fn step_forward(&mut self) {
        self.applied = (self.applied + 1).min(self.actions.len());
    }

    /// Drop every action that references `id`, keeping the cursor on the
    /// same surviving action. Returns how many were dropped.
    pub fn forget(&mut self, id: &NoteId) -> usize {
        let mut kept = VecDeque::with_capacity(self.actions.len());
        let mut applied = 0;
        let mut dropped = 0;

        for (index, action) in self.actions.drain(..).enumerate() {
            if action.note_id() == id {
                dropped += 1;
                continue;
            }
            if index < self.applied {
                applied += 1;
            }
            kept.push_back(action);
        }

        self.actions = kept;
        self.applied = applied;
        dropped
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.applied = 0;
    }

    /// Actions oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryAction> {
        self.actions.iter()
    }
}
