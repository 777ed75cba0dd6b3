use std::sync::Arc;

use super::*;
use crate::{history::testing::ManualClock, model::ColumnKey};

fn logger() -> HistoryLogger {
    HistoryLogger::with_clock("ana", Arc::new(ManualClock::new(1_000)))
}

const LEGACY_BOARD: &str = r#"{
    "id": "board-legacy",
    "name": "My Board",
    "backgroundColor": "bg-blue-100",
    "columns": [
        { "id": "col-1", "title": "To Do", "cards": [
            { "id": "card-1", "title": "Old card", "description": "", "columnId": "col-1", "priority": "low" }
        ] },
        { "id": "col-2", "title": "Done", "cards": [] }
    ]
}"#;

#[test]
fn missing_documents_give_an_empty_workspace() {
    let store = MemoryStore::new();
    let workspace = load_workspace(&store, &logger()).expect("load");
    assert_eq!(workspace, Workspace::default());
    assert!(store.get(WORKSPACE_KEY).expect("get").is_none());
}

#[test]
fn corrupt_workspace_is_replaced_by_empty() {
    let store = MemoryStore::new();
    store.set(WORKSPACE_KEY, "{not json").expect("set");
    let workspace = load_workspace(&store, &logger()).expect("load");
    assert!(workspace.groups.is_empty());
}

#[test]
fn legacy_board_migrates_into_one_group_with_board_active() {
    let store = MemoryStore::new();
    store.set(LEGACY_BOARD_KEY, LEGACY_BOARD).expect("set");

    let workspace = load_workspace(&store, &logger()).expect("load");
    assert_eq!(workspace.groups.len(), 1);
    let group = &workspace.groups[0];
    assert_eq!(group.title, "My Workspace");
    assert_eq!(workspace.active_group_id.as_ref(), Some(&group.id));
    assert_eq!(workspace.active_board_id.as_ref().map(|b| b.as_str()), Some("board-legacy"));

    let board = &group.boards[0];
    assert_eq!(board.group_id.as_ref(), Some(&group.id));
    assert_eq!(board.created_at, Some(1_000));
    assert_eq!(board.background_color, "bg-blue-100");
    let card = &board.columns[0].cards[0];
    assert!(card.history.is_empty());

    let persisted = store.get(WORKSPACE_KEY).expect("get").expect("saved");
    let reloaded: Workspace = serde_json::from_str(&persisted).expect("json");
    assert_eq!(&reloaded, &workspace);
}

#[test]
fn existing_workspace_wins_over_legacy_board() {
    let store = MemoryStore::new();
    let mut workspace = Workspace::default();
    workspace.groups.push(Group::new("Team", 5));
    save_workspace(&store, &workspace).expect("save");
    store.set(LEGACY_BOARD_KEY, LEGACY_BOARD).expect("set");

    let loaded = load_workspace(&store, &logger()).expect("load");
    assert_eq!(loaded.groups.len(), 1);
    assert_eq!(loaded.groups[0].title, "Team");
}

#[test]
fn load_repairs_stale_column_references() {
    let store = MemoryStore::new();
    store.set(LEGACY_BOARD_KEY, LEGACY_BOARD).expect("set");
    let mut workspace = load_workspace(&store, &logger()).expect("load");
    workspace.groups[0].boards[0].columns[0].cards[0].column_id = ColumnKey::from("col-2");
    save_workspace(&store, &workspace).expect("save");

    let reloaded = load_workspace(&store, &logger()).expect("reload");
    let board = &reloaded.groups[0].boards[0];
    assert_eq!(board.columns[0].cards[0].column_id.as_str(), "col-1");
    assert!(board.check_integrity().is_empty());
}

#[test]
fn file_store_round_trips_and_removes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("nested"));
    assert!(store.get("demo").expect("get").is_none());

    store.set("demo", "{\"a\":1}").expect("set");
    assert!(dir.path().join("nested").join("demo.json").exists());
    assert_eq!(store.get("demo").expect("get").as_deref(), Some("{\"a\":1}"));

    store.remove("demo").expect("remove");
    store.remove("demo").expect("remove twice");
    assert!(store.get("demo").expect("get").is_none());
}
