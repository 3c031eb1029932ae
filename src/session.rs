use crate::buffer::BlockBuffer;
use crate::error::{BuildError, Result};
use crate::history::History;
use crate::position::BlockPosition;
use crate::selection::Selection;

/// A copied volume's contents plus the selection minimum it was copied from.
/// Overwritten by each copy; read-only to paste.
#[derive(Debug, Clone)]
pub struct Clipboard {
    pub contents: BlockBuffer,
    pub anchor: BlockPosition,
}

/// Everything the build tool tracks for one player: selection, clipboard,
/// history, and the in-flight edit guard. Created lazily on a player's first
/// command, dropped when they disconnect.
#[derive(Debug)]
pub struct BuildSession {
    pub selection: Selection,
    pub clipboard: Option<Clipboard>,
    pub history: History,
    in_flight: bool,
}

impl BuildSession {
    pub fn new(history_depth: usize) -> Self {
        BuildSession {
            selection: Selection::default(),
            clipboard: None,
            history: History::new(history_depth),
            in_flight: false,
        }
    }

    /// Claim the session for one mutating operation. Hosts that stage
    /// expensive snapshot work off the simulation thread hold this claim for
    /// the whole staging+commit span; overlapping requests are rejected, not
    /// queued.
    pub fn begin_edit(&mut self) -> Result<()> {
        if self.in_flight {
            return Err(BuildError::OperationInProgress);
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn finish_edit(&mut self) {
        self.in_flight = false;
    }

    pub fn is_editing(&self) -> bool {
        self.in_flight
    }
}
