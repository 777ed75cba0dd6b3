//! Local Kanban workspace: the board tree, card/list editing, drag-and-drop
//! reordering with history, search, statistics, on-disk persistence and the
//! REST client used to mirror groups and boards onto a server.

pub mod board;
pub mod error;
pub mod filter;
pub mod history;
pub mod markup;
pub mod model;
pub mod persistence;
pub mod remote;
pub mod reorder;
pub mod stats;
pub mod workspace;

pub use board::{BoardEditor, CardField};
pub use error::ClientError;
pub use history::{Clock, HistoryLogger, SystemClock};
pub use persistence::{FileStore, LocalStore, MemoryStore};
pub use remote::{ResourceClient, WorkspaceSync};
pub use reorder::{DragItem, DragOutcome, DragSession, DropTarget, Placement};
pub use workspace::WorkspaceStore;
