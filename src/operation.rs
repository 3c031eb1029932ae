use crate::block_state::BlockState;
use crate::buffer::BlockBuffer;
use crate::error::{BuildError, Result};
use crate::region::Region;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reversible unit of world mutation.
///
/// A closed variant set so apply/invert dispatch is exhaustive. Each variant
/// carries everything needed to re-apply it; the pre-mutation state lives in
/// the [`Snapshot`] captured at apply time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Fill {
        target: Region,
        block: BlockState,
    },
    Replace {
        target: Region,
        from: BlockState,
        to: BlockState,
    },
    Clear {
        target: Region,
    },
    Paste {
        target: Region,
        contents: BlockBuffer,
    },
}

impl Operation {
    pub fn target(&self) -> &Region {
        match self {
            Operation::Fill { target, .. } => target,
            Operation::Replace { target, .. } => target,
            Operation::Clear { target } => target,
            Operation::Paste { target, .. } => target,
        }
    }

    /// Post-state of the target volume, computed from the captured pre-state.
    fn desired_state(&self, before: &BlockBuffer) -> BlockBuffer {
        match self {
            Operation::Fill { target, block } => BlockBuffer::filled(target.dimensions(), block),
            Operation::Clear { target } => {
                BlockBuffer::filled(target.dimensions(), &BlockState::air())
            }
            Operation::Replace { from, to, .. } => {
                let mut after = before.clone();
                after.replace_all(from, to);
                after
            }
            Operation::Paste { contents, .. } => contents.clone(),
        }
    }

    /// Mutate the world and return the snapshot that reverses it.
    ///
    /// The full snapshot is captured before any cell is written, so a write
    /// the host refuses partway through rolls the already-written prefix back
    /// and leaves the world as it was.
    pub fn apply(&self, world: &mut dyn World, max_volume: u64) -> Result<Snapshot> {
        let target = *self.target();
        if target.volume() == 0 {
            return Err(BuildError::OperationFailed("empty target volume".into()));
        }
        if !world.bounds().contains_region(&target) {
            return Err(BuildError::OperationFailed(format!(
                "target {} extends outside the world bounds {}",
                target,
                world.bounds()
            )));
        }
        if target.volume() > max_volume {
            return Err(BuildError::OperationFailed(format!(
                "edit of {} blocks exceeds the {} block limit",
                target.volume(),
                max_volume
            )));
        }

        let before = BlockBuffer::capture(world, &target)?;
        let after = self.desired_state(&before);
        write_volume(world, &target, &after, &before)?;

        Ok(Snapshot {
            target,
            cells: before,
        })
    }

    /// Short human-oriented summary, used in undo/redo confirmations and the
    /// history listing.
    pub fn describe(&self) -> String {
        match self {
            Operation::Fill { target, block } => {
                format!("fill {} blocks with {}", target.volume(), block)
            }
            Operation::Replace { from, to, .. } => format!("replace {} with {}", from, to),
            Operation::Clear { target } => format!("clear {} blocks", target.volume()),
            Operation::Paste { target, .. } => format!("paste {} blocks", target.volume()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Captured pre-mutation contents of an operation's target volume, sufficient
/// to restore prior state exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    target: Region,
    cells: BlockBuffer,
}

impl Snapshot {
    pub fn target(&self) -> &Region {
        &self.target
    }

    pub fn cells(&self) -> &BlockBuffer {
        &self.cells
    }

    /// Write the captured cells back, producing the exact inverse of the
    /// mutation this snapshot was taken for. Same cell ordering and cost as a
    /// fresh apply; a refused write rolls back to the state found on entry.
    pub fn restore(&self, world: &mut dyn World) -> Result<()> {
        if !world.bounds().contains_region(&self.target) {
            return Err(BuildError::OperationFailed(format!(
                "snapshot target {} extends outside the world bounds",
                self.target
            )));
        }
        if self.cells.volume() != self.target.volume() {
            // A shape mismatch means internal state corruption; surface it
            // rather than writing a partial volume.
            log::error!(
                "snapshot shape mismatch: {} cells for target {}",
                self.cells.volume(),
                self.target
            );
            return Err(BuildError::OperationFailed(
                "snapshot does not match its target volume".into(),
            ));
        }
        let found = BlockBuffer::capture(world, &self.target)?;
        write_volume(world, &self.target, &self.cells, &found)
    }
}

/// An operation together with the snapshot captured when it was applied.
/// Owned by whichever history stack currently references it.
#[derive(Debug, Clone)]
pub struct AppliedOperation {
    operation: Operation,
    snapshot: Snapshot,
}

impl AppliedOperation {
    pub fn new(operation: Operation, snapshot: Snapshot) -> Self {
        AppliedOperation {
            operation,
            snapshot,
        }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn into_operation(self) -> Operation {
        self.operation
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn describe(&self) -> String {
        self.operation.describe()
    }
}

/// Write `desired` over `target` cell by cell. On a refused write, restore the
/// already-written prefix from `fallback` so no partial application remains
/// visible.
fn write_volume(
    world: &mut dyn World,
    target: &Region,
    desired: &BlockBuffer,
    fallback: &BlockBuffer,
) -> Result<()> {
    for (i, pos) in target.iter().enumerate() {
        if !world.set_block(pos, desired.get_index(i)) {
            log::error!(
                "world refused write at {}; rolling back {} already-written cells",
                pos,
                i
            );
            for (j, prev) in target.iter().enumerate().take(i) {
                if !world.set_block(prev, fallback.get_index(j)) {
                    log::error!("rollback write refused at {}", prev);
                }
            }
            return Err(BuildError::OperationFailed(format!(
                "world refused write at {}",
                pos
            )));
        }
    }
    Ok(())
}
