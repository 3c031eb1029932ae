use crate::block_state::BlockState;
use crate::error::BuildError;
use crate::manager::{BuildSessionManager, Edit};
use crate::position::BlockPosition;
use crate::world::World;
use uuid::Uuid;

/// Permission nodes, one per command family.
pub mod permissions {
    pub const ROOT: &str = "athenabuild";

    pub const SELECT: &str = "athenabuild.select";
    pub const EDIT: &str = "athenabuild.edit";
    pub const HISTORY: &str = "athenabuild.history";
}

/// A player command after the host's framework has parsed name and arguments.
#[derive(Debug, Clone)]
pub enum Command {
    /// Stage the first selection corner.
    Pos1(BlockPosition),
    /// Stage the second selection corner.
    Pos2(BlockPosition),
    /// Set both corners at once.
    Select(BlockPosition, BlockPosition),
    Deselect,
    SelInfo,
    Fill(BlockState),
    Replace(BlockState, BlockState),
    Clear,
    Copy,
    Paste,
    Undo,
    Redo,
    History,
}

impl Command {
    pub fn permission(&self) -> &'static str {
        match self {
            Command::Pos1(_)
            | Command::Pos2(_)
            | Command::Select(..)
            | Command::Deselect
            | Command::SelInfo => permissions::SELECT,
            Command::Fill(_)
            | Command::Replace(..)
            | Command::Clear
            | Command::Copy
            | Command::Paste => permissions::EDIT,
            Command::Undo | Command::Redo | Command::History => permissions::HISTORY,
        }
    }
}

/// Execute one player command against the manager and render the outcome as
/// player-visible text. This is the only place error kinds become messages.
///
/// `has_permission` is the host's permission check for the acting player;
/// denial touches no session state.
pub fn dispatch(
    manager: &mut BuildSessionManager,
    world: &mut dyn World,
    player: Uuid,
    command: Command,
    has_permission: impl Fn(&str) -> bool,
) -> String {
    let node = command.permission();
    if !has_permission(node) {
        return render_error(&BuildError::PermissionDenied(node.to_string()));
    }

    match command {
        Command::Pos1(pos) => match manager.stage_corner(player, world, pos, true) {
            Ok(Some(region)) => format!(
                "First corner set to {}. Selection: {} ({} blocks).",
                pos,
                region,
                region.volume()
            ),
            Ok(None) => format!("First corner set to {}.", pos),
            Err(e) => render_error(&e),
        },
        Command::Pos2(pos) => match manager.stage_corner(player, world, pos, false) {
            Ok(Some(region)) => format!(
                "Second corner set to {}. Selection: {} ({} blocks).",
                pos,
                region,
                region.volume()
            ),
            Ok(None) => format!("Second corner set to {}.", pos),
            Err(e) => render_error(&e),
        },
        Command::Select(a, b) => match manager.select(player, world, a, b) {
            Ok(region) => format!("Selected {} ({} blocks).", region, region.volume()),
            Err(e) => render_error(&e),
        },
        Command::Deselect => {
            manager.clear_selection(player);
            "Selection cleared.".to_string()
        }
        Command::SelInfo => match manager.selection(player) {
            Ok(region) => format!(
                "Current selection: {} ({} blocks).",
                region,
                region.volume()
            ),
            Err(e) => render_error(&e),
        },
        Command::Fill(block) => {
            match manager.apply_operation(player, world, Edit::Fill(block)) {
                Ok(description) => format!("Done: {}.", description),
                Err(e) => render_error(&e),
            }
        }
        Command::Replace(from, to) => {
            match manager.apply_operation(player, world, Edit::Replace { from, to }) {
                Ok(description) => format!("Done: {}.", description),
                Err(e) => render_error(&e),
            }
        }
        Command::Clear => match manager.apply_operation(player, world, Edit::Clear) {
            Ok(description) => format!("Done: {}.", description),
            Err(e) => render_error(&e),
        },
        Command::Copy => match manager.copy(player, world) {
            Ok(volume) => format!("Copied {} blocks to your clipboard.", volume),
            Err(e) => render_error(&e),
        },
        Command::Paste => match manager.apply_operation(player, world, Edit::Paste) {
            Ok(description) => format!("Done: {}.", description),
            Err(e) => render_error(&e),
        },
        Command::Undo => match manager.undo(player, world) {
            Ok(description) => format!("Undid: {}.", description),
            Err(e) => render_error(&e),
        },
        Command::Redo => match manager.redo(player, world) {
            Ok(description) => format!("Redid: {}.", description),
            Err(e) => render_error(&e),
        },
        Command::History => {
            let (entries, redo_len) = manager.history_overview(player);
            if entries.is_empty() && redo_len == 0 {
                return "Your edit history is empty.".to_string();
            }
            let mut lines = vec![format!(
                "{} edits to undo, {} to redo:",
                entries.len(),
                redo_len
            )];
            for (i, entry) in entries.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, entry));
            }
            lines.join("\n")
        }
    }
}

fn render_error(error: &BuildError) -> String {
    match error {
        BuildError::InvalidSelection => {
            "Those coordinates are outside the editable world bounds.".to_string()
        }
        BuildError::NoSelection => "Make a selection first.".to_string(),
        BuildError::EmptyClipboard => "Your clipboard is empty; copy something first.".to_string(),
        BuildError::OperationFailed(reason) => format!("That edit failed: {}.", reason),
        BuildError::OperationInProgress => {
            "Your previous edit is still being applied; try again in a moment.".to_string()
        }
        BuildError::NothingToUndo => "Nothing to undo.".to_string(),
        BuildError::NothingToRedo => "Nothing to redo.".to_string(),
        BuildError::PermissionDenied(node) => {
            format!("You don't have permission to do that ({}).", node)
        }
    }
}
