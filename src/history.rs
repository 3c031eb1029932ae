use crate::error::{BuildError, Result};
use crate::operation::AppliedOperation;
use crate::world::World;
use std::collections::VecDeque;

/// Per-player undo/redo stacks of applied operations.
///
/// Strictly LIFO, never reordered or coalesced. Applying a new operation
/// clears the redo stack (branching-history invalidation). The undo stack is
/// bounded: once full, the oldest entry and its snapshot are silently
/// discarded, and that edit can no longer be undone.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<AppliedOperation>,
    redo: Vec<AppliedOperation>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record a freshly-applied operation.
    pub fn push(&mut self, entry: AppliedOperation) {
        self.redo.clear();
        self.undo.push_back(entry);
        if self.undo.len() > self.depth {
            if let Some(evicted) = self.undo.pop_front() {
                log::debug!("history full, evicting oldest entry: {}", evicted.describe());
            }
        }
    }

    /// Revert the most recent operation. On failure the world and both stacks
    /// are left exactly as they were.
    pub fn undo(&mut self, world: &mut dyn World) -> Result<String> {
        match self.undo.pop_back() {
            None => Err(BuildError::NothingToUndo),
            Some(entry) => match entry.snapshot().restore(world) {
                Ok(()) => {
                    let description = entry.describe();
                    self.redo.push(entry);
                    Ok(description)
                }
                Err(e) => {
                    self.undo.push_back(entry);
                    Err(e)
                }
            },
        }
    }

    /// Re-apply the most recently undone operation, refreshing its snapshot
    /// so redo-of-undo is indistinguishable from a fresh apply. On failure the
    /// world and both stacks are left exactly as they were.
    pub fn redo(&mut self, world: &mut dyn World, max_volume: u64) -> Result<String> {
        let snapshot = match self.redo.last() {
            None => return Err(BuildError::NothingToRedo),
            Some(entry) => entry.operation().apply(world, max_volume)?,
        };
        // The stack is only touched once the world mutation has succeeded.
        // Direct push onto undo: restoring a redone entry must not clear the
        // rest of the redo stack.
        if let Some(entry) = self.redo.pop() {
            let entry = AppliedOperation::new(entry.into_operation(), snapshot);
            let description = entry.describe();
            self.undo.push_back(entry);
            Ok(description)
        } else {
            Err(BuildError::NothingToRedo)
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Undo-stack descriptions, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = String> + '_ {
        self.undo.iter().rev().map(|entry| entry.describe())
    }
}
