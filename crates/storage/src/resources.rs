use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{BoardId, ColumnId, CommentId, FolderId, GroupId, LogId, StateId, TaskId},
    protocol::{
        BoardFilter, BoardPatch, BoardRecord, ColumnFilter, ColumnPatch, ColumnRecord,
        CommentFilter, CommentPatch, CommentRecord, FolderFilter, FolderPatch, FolderRecord,
        GroupPatch, GroupRecord, LogFilter, LogPatch, LogRecord, NewBoard, NewColumn, NewComment,
        NewFolder, NewGroup, NewLog, NewState, NewTask, NoFilter, StatePatch, StateRecord,
        TaskFilter, TaskPatch, TaskRecord,
    },
};
use sqlx::{sqlite::SqliteRow, Row};

use crate::{write_error, Repository, Storage};

fn group_from_row(row: &SqliteRow) -> GroupRecord {
    GroupRecord {
        id: GroupId(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<GroupRecord> for Storage {
    async fn list(&self, _filter: &NoFilter) -> Result<Vec<GroupRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM groups ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn find(&self, id: GroupId) -> Result<Option<GroupRecord>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM groups WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn insert(&self, draft: &NewGroup) -> Result<GroupRecord> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO groups (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "group"))?;
        Ok(group_from_row(&row))
    }

    async fn update(&self, id: GroupId, patch: &GroupPatch) -> Result<Option<GroupRecord>> {
        let row = sqlx::query(
            "UPDATE groups
             SET name = COALESCE(?1, name),
                 description = COALESCE(?2, description),
                 updated_at = ?3
             WHERE id = ?4
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "group"))?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn delete(&self, id: GroupId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn folder_from_row(row: &SqliteRow) -> FolderRecord {
    FolderRecord {
        id: FolderId(row.get("id")),
        name: row.get("name"),
        color: row.get("color"),
        group_id: row.get::<Option<i64>, _>("group_id").map(GroupId),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<FolderRecord> for Storage {
    async fn list(&self, filter: &FolderFilter) -> Result<Vec<FolderRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, color, group_id, created_at, updated_at
             FROM folders
             WHERE (?1 IS NULL OR group_id = ?1)
             ORDER BY id",
        )
        .bind(filter.group_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(folder_from_row).collect())
    }

    async fn find(&self, id: FolderId) -> Result<Option<FolderRecord>> {
        let row = sqlx::query(
            "SELECT id, name, color, group_id, created_at, updated_at FROM folders WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(folder_from_row))
    }

    async fn insert(&self, draft: &NewFolder) -> Result<FolderRecord> {
        let row = sqlx::query(
            "INSERT INTO folders (name, color, group_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             RETURNING id, name, color, group_id, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.color.as_deref())
        .bind(draft.group_id.map(|id| id.0))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "folder"))?;
        Ok(folder_from_row(&row))
    }

    async fn update(&self, id: FolderId, patch: &FolderPatch) -> Result<Option<FolderRecord>> {
        let row = sqlx::query(
            "UPDATE folders
             SET name = COALESCE(?1, name),
                 color = COALESCE(?2, color),
                 group_id = COALESCE(?3, group_id),
                 updated_at = ?4
             WHERE id = ?5
             RETURNING id, name, color, group_id, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.color.as_deref())
        .bind(patch.group_id.map(|id| id.0))
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "folder"))?;
        Ok(row.as_ref().map(folder_from_row))
    }

    async fn delete(&self, id: FolderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn board_from_row(row: &SqliteRow) -> BoardRecord {
    BoardRecord {
        id: BoardId(row.get("id")),
        name: row.get("name"),
        background_color: row.get("background_color"),
        group_id: row.get::<Option<i64>, _>("group_id").map(GroupId),
        folder_id: row.get::<Option<i64>, _>("folder_id").map(FolderId),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<BoardRecord> for Storage {
    async fn list(&self, filter: &BoardFilter) -> Result<Vec<BoardRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, background_color, group_id, folder_id, created_at, updated_at
             FROM boards
             WHERE (?1 IS NULL OR group_id = ?1) AND (?2 IS NULL OR folder_id = ?2)
             ORDER BY id",
        )
        .bind(filter.group_id.map(|id| id.0))
        .bind(filter.folder_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(board_from_row).collect())
    }

    async fn find(&self, id: BoardId) -> Result<Option<BoardRecord>> {
        let row = sqlx::query(
            "SELECT id, name, background_color, group_id, folder_id, created_at, updated_at
             FROM boards WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(board_from_row))
    }

    async fn insert(&self, draft: &NewBoard) -> Result<BoardRecord> {
        let row = sqlx::query(
            "INSERT INTO boards (name, background_color, group_id, folder_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING id, name, background_color, group_id, folder_id, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.background_color.as_deref())
        .bind(draft.group_id.map(|id| id.0))
        .bind(draft.folder_id.map(|id| id.0))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "board"))?;
        Ok(board_from_row(&row))
    }

    async fn update(&self, id: BoardId, patch: &BoardPatch) -> Result<Option<BoardRecord>> {
        let row = sqlx::query(
            "UPDATE boards
             SET name = COALESCE(?1, name),
                 background_color = COALESCE(?2, background_color),
                 group_id = COALESCE(?3, group_id),
                 folder_id = COALESCE(?4, folder_id),
                 updated_at = ?5
             WHERE id = ?6
             RETURNING id, name, background_color, group_id, folder_id, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.background_color.as_deref())
        .bind(patch.group_id.map(|id| id.0))
        .bind(patch.folder_id.map(|id| id.0))
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "board"))?;
        Ok(row.as_ref().map(board_from_row))
    }

    async fn delete(&self, id: BoardId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn column_from_row(row: &SqliteRow) -> ColumnRecord {
    ColumnRecord {
        id: ColumnId(row.get("id")),
        name: row.get("name"),
        color: row.get("color"),
        board_id: BoardId(row.get("board_id")),
        position: row.get("position"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<ColumnRecord> for Storage {
    async fn list(&self, filter: &ColumnFilter) -> Result<Vec<ColumnRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, color, board_id, position, created_at, updated_at
             FROM columns
             WHERE (?1 IS NULL OR board_id = ?1)
             ORDER BY position, id",
        )
        .bind(filter.board_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(column_from_row).collect())
    }

    async fn find(&self, id: ColumnId) -> Result<Option<ColumnRecord>> {
        let row = sqlx::query(
            "SELECT id, name, color, board_id, position, created_at, updated_at
             FROM columns WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(column_from_row))
    }

    async fn insert(&self, draft: &NewColumn) -> Result<ColumnRecord> {
        let row = sqlx::query(
            "INSERT INTO columns (name, color, board_id, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING id, name, color, board_id, position, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.color.as_deref())
        .bind(draft.board_id.0)
        .bind(draft.position)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "column"))?;
        Ok(column_from_row(&row))
    }

    async fn update(&self, id: ColumnId, patch: &ColumnPatch) -> Result<Option<ColumnRecord>> {
        let row = sqlx::query(
            "UPDATE columns
             SET name = COALESCE(?1, name),
                 color = COALESCE(?2, color),
                 board_id = COALESCE(?3, board_id),
                 position = COALESCE(?4, position),
                 updated_at = ?5
             WHERE id = ?6
             RETURNING id, name, color, board_id, position, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.color.as_deref())
        .bind(patch.board_id.map(|id| id.0))
        .bind(patch.position)
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "column"))?;
        Ok(row.as_ref().map(column_from_row))
    }

    async fn delete(&self, id: ColumnId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM columns WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn state_from_row(row: &SqliteRow) -> StateRecord {
    StateRecord {
        id: StateId(row.get("id")),
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<StateRecord> for Storage {
    async fn list(&self, _filter: &NoFilter) -> Result<Vec<StateRecord>> {
        let rows =
            sqlx::query("SELECT id, name, color, created_at, updated_at FROM states ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(state_from_row).collect())
    }

    async fn find(&self, id: StateId) -> Result<Option<StateRecord>> {
        let row =
            sqlx::query("SELECT id, name, color, created_at, updated_at FROM states WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.as_ref().map(state_from_row))
    }

    async fn insert(&self, draft: &NewState) -> Result<StateRecord> {
        let row = sqlx::query(
            "INSERT INTO states (name, color, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             RETURNING id, name, color, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.color.as_deref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "state"))?;
        Ok(state_from_row(&row))
    }

    async fn update(&self, id: StateId, patch: &StatePatch) -> Result<Option<StateRecord>> {
        let row = sqlx::query(
            "UPDATE states
             SET name = COALESCE(?1, name),
                 color = COALESCE(?2, color),
                 updated_at = ?3
             WHERE id = ?4
             RETURNING id, name, color, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.color.as_deref())
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "state"))?;
        Ok(row.as_ref().map(state_from_row))
    }

    async fn delete(&self, id: StateId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM states WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn task_from_row(row: &SqliteRow) -> TaskRecord {
    TaskRecord {
        id: TaskId(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
        color: row.get("color"),
        column_id: ColumnId(row.get("column_id")),
        state_id: row.get::<Option<i64>, _>("state_id").map(StateId),
        position: row.get("position"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<TaskRecord> for Storage {
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, description, color, column_id, state_id, position, created_at, updated_at
             FROM tasks
             WHERE (?1 IS NULL OR column_id = ?1) AND (?2 IS NULL OR state_id = ?2)
             ORDER BY position, id",
        )
        .bind(filter.column_id.map(|id| id.0))
        .bind(filter.state_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(task_from_row).collect())
    }

    async fn find(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(
            "SELECT id, name, description, color, column_id, state_id, position, created_at, updated_at
             FROM tasks WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(task_from_row))
    }

    async fn insert(&self, draft: &NewTask) -> Result<TaskRecord> {
        let row = sqlx::query(
            "INSERT INTO tasks (name, description, color, column_id, state_id, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING id, name, description, color, column_id, state_id, position, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(draft.color)
        .bind(draft.column_id.0)
        .bind(draft.state_id.map(|id| id.0))
        .bind(draft.position)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "task"))?;
        Ok(task_from_row(&row))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(
            "UPDATE tasks
             SET name = COALESCE(?1, name),
                 description = COALESCE(?2, description),
                 color = COALESCE(?3, color),
                 column_id = COALESCE(?4, column_id),
                 state_id = COALESCE(?5, state_id),
                 position = COALESCE(?6, position),
                 updated_at = ?7
             WHERE id = ?8
             RETURNING id, name, description, color, column_id, state_id, position, created_at, updated_at",
        )
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.color)
        .bind(patch.column_id.map(|id| id.0))
        .bind(patch.state_id.map(|id| id.0))
        .bind(patch.position)
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "task"))?;
        Ok(row.as_ref().map(task_from_row))
    }

    async fn delete(&self, id: TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn comment_from_row(row: &SqliteRow) -> CommentRecord {
    CommentRecord {
        id: CommentId(row.get("id")),
        task_id: TaskId(row.get("task_id")),
        parent_id: row.get::<Option<i64>, _>("parent_id").map(CommentId),
        author: row.get("author"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<CommentRecord> for Storage {
    async fn list(&self, filter: &CommentFilter) -> Result<Vec<CommentRecord>> {
        let rows = sqlx::query(
            "SELECT id, task_id, parent_id, author, body, created_at, updated_at
             FROM comments
             WHERE (?1 IS NULL OR task_id = ?1)
             ORDER BY id",
        )
        .bind(filter.task_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn find(&self, id: CommentId) -> Result<Option<CommentRecord>> {
        let row = sqlx::query(
            "SELECT id, task_id, parent_id, author, body, created_at, updated_at
             FROM comments WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn insert(&self, draft: &NewComment) -> Result<CommentRecord> {
        let row = sqlx::query(
            "INSERT INTO comments (task_id, parent_id, author, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING id, task_id, parent_id, author, body, created_at, updated_at",
        )
        .bind(draft.task_id.0)
        .bind(draft.parent_id.map(|id| id.0))
        .bind(&draft.author)
        .bind(&draft.body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "comment"))?;
        Ok(comment_from_row(&row))
    }

    async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<Option<CommentRecord>> {
        let row = sqlx::query(
            "UPDATE comments
             SET body = COALESCE(?1, body),
                 updated_at = ?2
             WHERE id = ?3
             RETURNING id, task_id, parent_id, author, body, created_at, updated_at",
        )
        .bind(patch.body.as_deref())
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "comment"))?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn delete(&self, id: CommentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn log_from_row(row: &SqliteRow) -> LogRecord {
    LogRecord {
        id: LogId(row.get("id")),
        task_id: row.get::<Option<i64>, _>("task_id").map(TaskId),
        board_id: row.get::<Option<i64>, _>("board_id").map(BoardId),
        author: row.get("author"),
        message: row.get("message"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Repository<LogRecord> for Storage {
    /// Newest first, matching the client's activity feed.
    async fn list(&self, filter: &LogFilter) -> Result<Vec<LogRecord>> {
        let rows = sqlx::query(
            "SELECT id, task_id, board_id, author, message, created_at, updated_at
             FROM logs
             WHERE (?1 IS NULL OR task_id = ?1) AND (?2 IS NULL OR board_id = ?2)
             ORDER BY id DESC",
        )
        .bind(filter.task_id.map(|id| id.0))
        .bind(filter.board_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(log_from_row).collect())
    }

    async fn find(&self, id: LogId) -> Result<Option<LogRecord>> {
        let row = sqlx::query(
            "SELECT id, task_id, board_id, author, message, created_at, updated_at
             FROM logs WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(log_from_row))
    }

    async fn insert(&self, draft: &NewLog) -> Result<LogRecord> {
        let row = sqlx::query(
            "INSERT INTO logs (task_id, board_id, author, message, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING id, task_id, board_id, author, message, created_at, updated_at",
        )
        .bind(draft.task_id.map(|id| id.0))
        .bind(draft.board_id.map(|id| id.0))
        .bind(&draft.author)
        .bind(&draft.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "log"))?;
        Ok(log_from_row(&row))
    }

    async fn update(&self, id: LogId, patch: &LogPatch) -> Result<Option<LogRecord>> {
        let row = sqlx::query(
            "UPDATE logs
             SET message = COALESCE(?1, message),
                 updated_at = ?2
             WHERE id = ?3
             RETURNING id, task_id, board_id, author, message, created_at, updated_at",
        )
        .bind(patch.message.as_deref())
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "log"))?;
        Ok(row.as_ref().map(log_from_row))
    }

    async fn delete(&self, id: LogId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM logs WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
