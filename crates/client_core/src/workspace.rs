use shared::domain::{BoardId, GroupId};
use tracing::debug;

use crate::{
    board::{non_empty, BoardEditor},
    error::{ClientError, Result},
    history::{messages, HistoryLogger},
    model::{Board, BoardKey, Column, Group, GroupKey, Workspace},
    persistence::{load_workspace, save_workspace, LocalStore},
};

/// Lists every new board starts with: title and color.
pub const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("To Do", "bg-slate-200 dark:bg-gray-700"),
    ("In Progress", "bg-blue-200 dark:bg-blue-900/40"),
    ("Done", "bg-green-200 dark:bg-green-900/40"),
];

/// The local workspace tree plus the store it is written to. Every mutation
/// is persisted before it returns.
pub struct WorkspaceStore<S: LocalStore> {
    store: S,
    logger: HistoryLogger,
    workspace: Workspace,
}

impl<S: LocalStore> WorkspaceStore<S> {
    pub fn open(store: S, logger: HistoryLogger) -> Result<Self> {
        let workspace = load_workspace(&store, &logger)?;
        Ok(Self {
            store,
            logger,
            workspace,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn logger(&self) -> &HistoryLogger {
        &self.logger
    }

    pub fn save(&self) -> Result<()> {
        save_workspace(&self.store, &self.workspace)
    }

    /// The first group created becomes the active one.
    pub fn create_group(&mut self, title: &str) -> Result<GroupKey> {
        let title = non_empty(title)?;
        let group = Group::new(title, self.logger.now());
        let key = group.id.clone();
        self.workspace.groups.push(group);
        if self.workspace.groups.len() == 1 {
            self.workspace.active_group_id = Some(key.clone());
        }
        self.save()?;
        debug!(group = %key, "group created");
        Ok(key)
    }

    pub fn delete_group(&mut self, id: &GroupKey) -> Result<Group> {
        let index = self
            .workspace
            .groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| ClientError::GroupNotFound(id.clone()))?;
        let removed = self.workspace.groups.remove(index);

        let owned_active_board = self
            .workspace
            .active_board_id
            .as_ref()
            .is_some_and(|active| removed.boards.iter().any(|b| &b.id == active));
        if self.workspace.active_group_id.as_ref() == Some(id) {
            self.workspace.active_group_id = self.workspace.groups.first().map(|g| g.id.clone());
            self.workspace.active_board_id = None;
        } else if owned_active_board {
            self.workspace.active_board_id = None;
        }
        self.save()?;
        Ok(removed)
    }

    pub fn rename_group(&mut self, id: &GroupKey, title: &str) -> Result<()> {
        let title = non_empty(title)?;
        let group = self
            .workspace
            .group_mut(id)
            .ok_or_else(|| ClientError::GroupNotFound(id.clone()))?;
        group.title = title.to_string();
        self.save()
    }

    /// New boards get the default lists and become active when no board is.
    pub fn create_board(&mut self, group: &GroupKey, title: &str) -> Result<BoardKey> {
        let title = non_empty(title)?;
        let now = self.logger.now();
        let mut board = Board::new(title, group.clone(), now);
        board.columns = DEFAULT_COLUMNS
            .iter()
            .map(|(title, color)| Column::new(*title, *color))
            .collect();
        self.logger
            .record_activity(&mut board, messages::BOARD_CREATED);
        let key = board.id.clone();

        let owner = self
            .workspace
            .group_mut(group)
            .ok_or_else(|| ClientError::GroupNotFound(group.clone()))?;
        owner.boards.push(board);
        if self.workspace.active_board_id.is_none() {
            self.workspace.active_board_id = Some(key.clone());
            self.workspace.active_group_id = Some(group.clone());
        }
        self.save()?;
        debug!(board = %key, group = %group, "board created");
        Ok(key)
    }

    pub fn delete_board(&mut self, id: &BoardKey) -> Result<Board> {
        let group = self
            .workspace
            .groups
            .iter_mut()
            .find(|g| g.boards.iter().any(|b| &b.id == id))
            .ok_or_else(|| ClientError::BoardNotFound(id.clone()))?;
        let index = group
            .boards
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| ClientError::BoardNotFound(id.clone()))?;
        let removed = group.boards.remove(index);
        if self.workspace.active_board_id.as_ref() == Some(id) {
            self.workspace.active_board_id = None;
        }
        self.save()?;
        Ok(removed)
    }

    pub fn rename_board(&mut self, id: &BoardKey, title: &str) -> Result<()> {
        let title = non_empty(title)?;
        self.board_mut(id)?.name = title.to_string();
        self.save()
    }

    /// Also makes the board's group the active group.
    pub fn set_active_board(&mut self, id: &BoardKey) -> Result<()> {
        let group = self
            .workspace
            .group_of_board(id)
            .map(|g| g.id.clone())
            .ok_or_else(|| ClientError::BoardNotFound(id.clone()))?;
        self.workspace.active_board_id = Some(id.clone());
        self.workspace.active_group_id = Some(group);
        self.save()
    }

    pub fn active_board(&self) -> Option<&Board> {
        let id = self.workspace.active_board_id.as_ref()?;
        self.workspace.board(id)
    }

    pub fn board(&self, id: &BoardKey) -> Option<&Board> {
        self.workspace.board(id)
    }

    pub fn all_boards(&self) -> impl Iterator<Item = &Board> {
        self.workspace.all_boards()
    }

    pub fn set_background_color(&mut self, id: &BoardKey, color: &str) -> Result<()> {
        self.board_mut(id)?.background_color = color.to_string();
        self.save()
    }

    /// Runs card/list edits against one board. The board is replaced and
    /// persisted only when every edit succeeds.
    pub fn edit_board<T>(
        &mut self,
        id: &BoardKey,
        edit: impl FnOnce(&mut BoardEditor<'_>) -> Result<T>,
    ) -> Result<T> {
        self.update_board(id, |board, logger| {
            edit(&mut BoardEditor::new(board, logger))
        })
    }

    /// Like [`Self::edit_board`] but hands out the raw board, for the
    /// reorder engine.
    pub fn update_board<T>(
        &mut self,
        id: &BoardKey,
        update: impl FnOnce(&mut Board, &HistoryLogger) -> Result<T>,
    ) -> Result<T> {
        let logger = self.logger.clone();
        let mut draft = self.board_mut(id)?.clone();
        let value = update(&mut draft, &logger)?;
        *self.board_mut(id)? = draft;
        self.save()?;
        Ok(value)
    }

    pub fn set_group_remote_id(&mut self, id: &GroupKey, remote: GroupId) -> Result<()> {
        let group = self
            .workspace
            .group_mut(id)
            .ok_or_else(|| ClientError::GroupNotFound(id.clone()))?;
        group.remote_id = Some(remote);
        self.save()
    }

    pub fn set_board_remote_id(&mut self, id: &BoardKey, remote: BoardId) -> Result<()> {
        self.board_mut(id)?.remote_id = Some(remote);
        self.save()
    }

    fn board_mut(&mut self, id: &BoardKey) -> Result<&mut Board> {
        self.workspace
            .board_mut(id)
            .ok_or_else(|| ClientError::BoardNotFound(id.clone()))
    }
}

#[cfg(test)]
#[path = "tests/workspace_tests.rs"]
mod tests;
