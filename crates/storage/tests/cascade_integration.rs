use shared::protocol::{
    BoardFilter, BoardRecord, ColumnRecord, CommentFilter, CommentRecord, FolderRecord,
    GroupRecord, LogFilter, LogRecord, NewBoard, NewColumn, NewComment, NewFolder, NewGroup,
    NewLog, NewTask, TaskFilter, TaskRecord,
};
use storage::{Repository, Storage};

#[tokio::test]
async fn deleting_a_group_cascades_through_the_board_tree() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let group = Repository::<GroupRecord>::insert(
        &storage,
        &NewGroup {
            name: "Operations".into(),
            description: None,
        },
    )
    .await
    .expect("group");
    let folder = Repository::<FolderRecord>::insert(
        &storage,
        &NewFolder {
            name: "Q3".into(),
            color: Some("bg-blue-500".into()),
            group_id: Some(group.id),
        },
    )
    .await
    .expect("folder");
    let board = Repository::<BoardRecord>::insert(
        &storage,
        &NewBoard {
            name: "Incidents".into(),
            background_color: None,
            group_id: Some(group.id),
            folder_id: Some(folder.id),
        },
    )
    .await
    .expect("board");
    let column = Repository::<ColumnRecord>::insert(
        &storage,
        &NewColumn {
            name: "Open".into(),
            color: None,
            board_id: board.id,
            position: 0.0,
        },
    )
    .await
    .expect("column");
    let task = Repository::<TaskRecord>::insert(
        &storage,
        &NewTask {
            name: "rotate certificates".into(),
            description: Some("expires friday".into()),
            color: None,
            column_id: column.id,
            state_id: None,
            position: 0.0,
        },
    )
    .await
    .expect("task");
    let parent = Repository::<CommentRecord>::insert(
        &storage,
        &NewComment {
            task_id: task.id,
            parent_id: None,
            author: "ana".into(),
            body: "who owns this?".into(),
        },
    )
    .await
    .expect("comment");
    Repository::<CommentRecord>::insert(
        &storage,
        &NewComment {
            task_id: task.id,
            parent_id: Some(parent.id),
            author: "li".into(),
            body: "me".into(),
        },
    )
    .await
    .expect("reply");
    Repository::<LogRecord>::insert(
        &storage,
        &NewLog {
            task_id: Some(task.id),
            board_id: Some(board.id),
            author: "ana".into(),
            message: "Card created".into(),
        },
    )
    .await
    .expect("log");

    assert!(Repository::<GroupRecord>::delete(&storage, group.id)
        .await
        .expect("delete group"));

    let boards = Repository::<BoardRecord>::list(&storage, &BoardFilter::default())
        .await
        .expect("boards");
    assert!(boards.is_empty());
    let tasks = Repository::<TaskRecord>::list(&storage, &TaskFilter::default())
        .await
        .expect("tasks");
    assert!(tasks.is_empty());
    let comments = Repository::<CommentRecord>::list(&storage, &CommentFilter::default())
        .await
        .expect("comments");
    assert!(comments.is_empty());
    let logs = Repository::<LogRecord>::list(&storage, &LogFilter::default())
        .await
        .expect("logs");
    assert!(logs.is_empty());
}
