//! Build-session core for in-game map construction tooling.
//!
//! Players select regions of a running game world, apply reversible editing
//! operations to them, and undo/redo those operations. The crate is
//! host-agnostic: world storage is reached through the [`World`] trait, parsed
//! commands arrive as [`Command`] values, and the host's command framework
//! renders the returned message text. All state is per-player, in-memory, and
//! released on disconnect.
//!
//! Every mutation captures a full snapshot before writing, so an edit is
//! all-or-nothing even when the host refuses an individual cell write, and
//! undo restores prior state byte for byte.

pub mod block_state;
pub mod buffer;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod manager;
pub mod operation;
pub mod position;
pub mod region;
pub mod selection;
pub mod session;
pub mod world;

pub use block_state::BlockState;
pub use buffer::BlockBuffer;
pub use command::{dispatch, Command};
pub use config::BuildConfig;
pub use error::{BuildError, Result};
pub use history::History;
pub use manager::{BuildSessionManager, Edit};
pub use operation::{AppliedOperation, Operation, Snapshot};
pub use position::BlockPosition;
pub use region::Region;
pub use selection::Selection;
pub use session::{BuildSession, Clipboard};
pub use world::{MemoryWorld, World};
