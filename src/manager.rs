use crate::block_state::BlockState;
use crate::buffer::BlockBuffer;
use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::operation::{AppliedOperation, Operation};
use crate::position::BlockPosition;
use crate::region::Region;
use crate::session::{BuildSession, Clipboard};
use crate::world::World;
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// An edit request as it arrives from the command layer. The manager resolves
/// it against the acting player's selection and clipboard to build the actual
/// [`Operation`].
#[derive(Debug, Clone)]
pub enum Edit {
    Fill(BlockState),
    Replace { from: BlockState, to: BlockState },
    Clear,
    Paste,
}

/// Owns every player's build session and mediates all access to them; the
/// unique write path into world state for this subsystem.
///
/// All methods are assumed to run on the host's single simulation thread
/// (command handlers as tick-synchronous callbacks), so no internal locking is
/// needed. The per-session in-flight guard still rejects overlapping edits if
/// a host stages expensive snapshot work asynchronously.
#[derive(Debug, Default)]
pub struct BuildSessionManager {
    sessions: FxHashMap<Uuid, BuildSession>,
    config: BuildConfig,
}

impl BuildSessionManager {
    pub fn new(config: BuildConfig) -> Self {
        BuildSessionManager {
            sessions: FxHashMap::default(),
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The player's session, created empty on first use. Never fails.
    pub fn session_for(&mut self, player: Uuid) -> &mut BuildSession {
        let depth = self.config.history_depth;
        self.sessions.entry(player).or_insert_with(|| {
            log::debug!("creating build session for {}", player);
            BuildSession::new(depth)
        })
    }

    /// Release all session state: selection, clipboard, history.
    pub fn drop_session(&mut self, player: Uuid) {
        if self.sessions.remove(&player).is_some() {
            log::debug!("dropped build session for {}", player);
        }
    }

    /// Sessions are created lazily, so join is a no-op hook.
    pub fn handle_join(&self, _player: Uuid) {}

    pub fn handle_quit(&mut self, player: Uuid) {
        self.drop_session(player);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Replace the player's selection from two corners.
    pub fn select(
        &mut self,
        player: Uuid,
        world: &dyn World,
        a: BlockPosition,
        b: BlockPosition,
    ) -> Result<Region> {
        self.validate_corner(world, a)?;
        self.validate_corner(world, b)?;
        Ok(self.session_for(player).selection.set(a, b))
    }

    /// Stage a single wand corner; returns the new region once both corners
    /// are staged.
    pub fn stage_corner(
        &mut self,
        player: Uuid,
        world: &dyn World,
        pos: BlockPosition,
        first: bool,
    ) -> Result<Option<Region>> {
        self.validate_corner(world, pos)?;
        Ok(self.session_for(player).selection.stage(pos, first))
    }

    pub fn clear_selection(&mut self, player: Uuid) {
        if let Some(session) = self.sessions.get_mut(&player) {
            session.selection.clear();
        }
    }

    pub fn selection(&self, player: Uuid) -> Result<Region> {
        match self.sessions.get(&player) {
            Some(session) => session.selection.current(),
            None => Err(BuildError::NoSelection),
        }
    }

    fn validate_corner(&self, world: &dyn World, pos: BlockPosition) -> Result<()> {
        if !world.bounds().contains(pos)
            || pos.y < self.config.min_height
            || pos.y > self.config.max_height
        {
            return Err(BuildError::InvalidSelection);
        }
        Ok(())
    }

    /// Copy the current selection into the player's clipboard. Non-destructive
    /// to the world and never recorded in history.
    pub fn copy(&mut self, player: Uuid, world: &dyn World) -> Result<u64> {
        let max_volume = self.config.max_edit_volume;
        let session = self.session_for(player);
        let region = session.selection.current()?;
        if region.volume() > max_volume {
            return Err(BuildError::OperationFailed(format!(
                "copy of {} blocks exceeds the {} block limit",
                region.volume(),
                max_volume
            )));
        }
        session.begin_edit()?;
        let captured = BlockBuffer::capture(world, &region);
        session.finish_edit();
        let contents = captured?;

        let volume = contents.volume();
        session.clipboard = Some(Clipboard {
            contents,
            anchor: region.min(),
        });
        Ok(volume)
    }

    /// Build an operation from the edit request against the player's current
    /// selection and clipboard, apply it, and push it onto their history.
    ///
    /// This is the single serialization point: at most one edit per player is
    /// ever in flight, and a failure at any stage leaves selection, clipboard,
    /// and history exactly as they were.
    pub fn apply_operation(
        &mut self,
        player: Uuid,
        world: &mut dyn World,
        edit: Edit,
    ) -> Result<String> {
        let max_volume = self.config.max_edit_volume;
        let session = self.session_for(player);

        session.begin_edit()?;
        let outcome = build_operation(session, edit)
            .and_then(|operation| {
                let snapshot = operation.apply(world, max_volume)?;
                Ok((operation, snapshot))
            });
        session.finish_edit();

        let (operation, snapshot) = outcome?;
        let entry = AppliedOperation::new(operation, snapshot);
        let description = entry.describe();
        session.history.push(entry);
        Ok(description)
    }

    /// Revert the player's most recent edit.
    pub fn undo(&mut self, player: Uuid, world: &mut dyn World) -> Result<String> {
        let session = self.session_for(player);
        session.begin_edit()?;
        let result = session.history.undo(world);
        session.finish_edit();
        result
    }

    /// Re-apply the player's most recently undone edit.
    pub fn redo(&mut self, player: Uuid, world: &mut dyn World) -> Result<String> {
        let max_volume = self.config.max_edit_volume;
        let session = self.session_for(player);
        session.begin_edit()?;
        let result = session.history.redo(world, max_volume);
        session.finish_edit();
        result
    }

    /// Undo-stack descriptions (most recent first) plus the redo count, for
    /// the history listing.
    pub fn history_overview(&self, player: Uuid) -> (Vec<String>, usize) {
        match self.sessions.get(&player) {
            Some(session) => (
                session.history.entries().collect(),
                session.history.redo_len(),
            ),
            None => (Vec::new(), 0),
        }
    }
}

fn build_operation(session: &BuildSession, edit: Edit) -> Result<Operation> {
    match edit {
        Edit::Fill(block) => Ok(Operation::Fill {
            target: session.selection.current()?,
            block,
        }),
        Edit::Replace { from, to } => Ok(Operation::Replace {
            target: session.selection.current()?,
            from,
            to,
        }),
        Edit::Clear => Ok(Operation::Clear {
            target: session.selection.current()?,
        }),
        Edit::Paste => {
            let anchor = session.selection.current()?.min();
            let clipboard = session
                .clipboard
                .as_ref()
                .ok_or(BuildError::EmptyClipboard)?;
            Ok(Operation::Paste {
                target: Region::from_position_and_size(anchor, clipboard.contents.size()),
                contents: clipboard.contents.clone(),
            })
        }
    }
}
