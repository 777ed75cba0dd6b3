use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::{info, warn};

use crate::{
    error::Result,
    history::HistoryLogger,
    model::{Board, Group, Workspace},
};

pub const WORKSPACE_KEY: &str = "OPENKANBAN_WORKSPACE";
/// Single-board document written by older clients.
pub const LEGACY_BOARD_KEY: &str = "OPENKANBAN_BOARD";
pub const LEGACY_GROUP_TITLE: &str = "My Workspace";

/// String key/value storage for the local workspace document.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform data dir>/openkanban`, when the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("openkanban"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Reads the workspace document.
///
/// A corrupt document is logged and replaced by an empty workspace. When no
/// workspace exists yet but an old single-board document does, that board is
/// moved into a fresh group and the result is written back immediately.
pub fn load_workspace(store: &dyn LocalStore, logger: &HistoryLogger) -> Result<Workspace> {
    let mut workspace = match store.get(WORKSPACE_KEY)? {
        Some(raw) => match serde_json::from_str::<Workspace>(&raw) {
            Ok(workspace) => workspace,
            Err(error) => {
                warn!(%error, "stored workspace is unreadable; starting empty");
                Workspace::default()
            }
        },
        None => match migrate_legacy_board(store, logger)? {
            Some(workspace) => workspace,
            None => Workspace::default(),
        },
    };

    let repaired: usize = workspace
        .groups
        .iter_mut()
        .flat_map(|g| g.boards.iter_mut())
        .map(Board::repair_back_references)
        .sum();
    if repaired > 0 {
        warn!(repaired, "fixed cards whose list reference was stale");
    }
    Ok(workspace)
}

pub fn save_workspace(store: &dyn LocalStore, workspace: &Workspace) -> Result<()> {
    let raw = serde_json::to_string(workspace)?;
    store.set(WORKSPACE_KEY, &raw)
}

fn migrate_legacy_board(
    store: &dyn LocalStore,
    logger: &HistoryLogger,
) -> Result<Option<Workspace>> {
    let Some(raw) = store.get(LEGACY_BOARD_KEY)? else {
        return Ok(None);
    };
    let mut board: Board = match serde_json::from_str(&raw) {
        Ok(board) => board,
        Err(error) => {
            warn!(%error, "legacy board is unreadable; ignoring it");
            return Ok(None);
        }
    };

    let now = logger.now();
    let mut group = Group::new(LEGACY_GROUP_TITLE, now);
    board.group_id = Some(group.id.clone());
    board.created_at = Some(now);

    let active_board_id = Some(board.id.clone());
    group.boards.push(board);
    let workspace = Workspace {
        active_group_id: Some(group.id.clone()),
        active_board_id,
        groups: vec![group],
    };
    save_workspace(store, &workspace)?;
    info!("migrated legacy board into a new workspace");
    Ok(Some(workspace))
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
