use std::sync::Arc;

use super::*;
use crate::{
    history::testing::ManualClock,
    model::{Card, Column, GroupKey, Priority, DEFAULT_COLUMN_COLOR},
};

struct Fixture {
    board: Board,
    logger: HistoryLogger,
    todo: ColumnKey,
    doing: ColumnKey,
    done: ColumnKey,
}

/// To Do: a, b, c / In Progress: d / Done: (empty)
fn fixture() -> Fixture {
    let mut board = Board::new("Launch", GroupKey::from("group-1"), 0);
    for (title, cards) in [
        ("To Do", &["a", "b", "c"][..]),
        ("In Progress", &["d"][..]),
        ("Done", &[][..]),
    ] {
        let mut column = Column::new(title, DEFAULT_COLUMN_COLOR);
        for card in cards {
            let mut card = Card::new(column.id.clone(), *card, Priority::Medium);
            card.id = CardKey::from(format!("card-{}", card.title));
            column.cards.push(card);
        }
        board.columns.push(column);
    }
    Fixture {
        todo: board.columns[0].id.clone(),
        doing: board.columns[1].id.clone(),
        done: board.columns[2].id.clone(),
        board,
        logger: HistoryLogger::with_clock("ana", Arc::new(ManualClock::new(7))),
    }
}

fn key(title: &str) -> CardKey {
    CardKey::from(format!("card-{title}"))
}

fn titles(board: &Board, column: usize) -> Vec<&str> {
    board.columns[column]
        .cards
        .iter()
        .map(|c| c.title.as_str())
        .collect()
}

#[test]
fn array_move_places_item_at_target_index() {
    let mut items = vec![1, 2, 3, 4];
    array_move(&mut items, 0, 2);
    assert_eq!(items, [2, 3, 1, 4]);
    array_move(&mut items, 3, 0);
    assert_eq!(items, [4, 2, 3, 1]);
    array_move(&mut items, 1, 99);
    assert_eq!(items, [4, 3, 1, 2]);
    array_move(&mut items, 10, 0);
    assert_eq!(items, [4, 3, 1, 2]);
}

#[test]
fn cross_column_drop_moves_card_and_logs_once() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("b"))).expect("start");
    let target = DropTarget::Card(key("d"));
    assert!(session.over(&mut fx.board, &target, Placement::After));
    // repeated hover over the same list changes nothing
    assert!(!session.over(&mut fx.board, &target, Placement::After));

    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Card(key("b"))), &fx.logger)
        .expect("end");
    assert_eq!(
        outcome,
        DragOutcome::CardMoved {
            card: key("b"),
            from_column: fx.todo.clone(),
            to_column: fx.doing.clone(),
            index: 1,
        }
    );
    assert_eq!(titles(&fx.board, 0), ["a", "c"]);
    assert_eq!(titles(&fx.board, 1), ["d", "b"]);

    let moved = fx.board.card(&key("b")).expect("card");
    assert_eq!(moved.column_id, fx.doing);
    assert_eq!(moved.history.len(), 1);
    assert_eq!(moved.history[0].message, "Moved from **To Do** to **In Progress**");
    assert_eq!(fx.board.activity_log.len(), 1);
    assert_eq!(
        fx.board.activity_log[0].message,
        "Moved \"b\" from **To Do** to **In Progress**"
    );
    assert!(fx.board.check_integrity().is_empty());
}

#[test]
fn hover_before_inserts_at_target_index() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("d"))).expect("start");
    assert!(session.over(&mut fx.board, &DropTarget::Card(key("b")), Placement::Before));
    assert_eq!(titles(&fx.board, 0), ["a", "d", "b", "c"]);
    assert!(fx.board.columns[1].cards.is_empty());
    assert_eq!(fx.board.card(&key("d")).expect("d").column_id, fx.todo);
}

#[test]
fn drop_without_hover_still_moves_across_columns() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("a"))).expect("start");
    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Column(fx.done.clone())), &fx.logger)
        .expect("end");
    assert!(matches!(outcome, DragOutcome::CardMoved { index: 0, .. }));
    assert_eq!(titles(&fx.board, 2), ["a"]);
    assert_eq!(fx.board.card(&key("a")).expect("a").history.len(), 1);
}

#[test]
fn reorder_within_column_logs_nothing() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("a"))).expect("start");
    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Card(key("c"))), &fx.logger)
        .expect("end");
    assert_eq!(
        outcome,
        DragOutcome::CardReordered {
            card: key("a"),
            column: fx.todo.clone(),
            from: 0,
            to: 2,
        }
    );
    assert_eq!(titles(&fx.board, 0), ["b", "c", "a"]);
    assert!(fx.board.activity_log.is_empty());
    assert!(fx.board.cards().all(|c| c.history.is_empty()));
}

#[test]
fn dropping_on_own_column_moves_card_to_end() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("a"))).expect("start");
    session
        .end(&mut fx.board, Some(&DropTarget::Column(fx.todo.clone())), &fx.logger)
        .expect("end");
    assert_eq!(titles(&fx.board, 0), ["b", "c", "a"]);
    assert!(fx.board.activity_log.is_empty());
}

#[test]
fn dropping_on_itself_is_unchanged() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("b"))).expect("start");
    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Card(key("b"))), &fx.logger)
        .expect("end");
    assert_eq!(outcome, DragOutcome::Unchanged);
    assert_eq!(titles(&fx.board, 0), ["a", "b", "c"]);
}

#[test]
fn out_and_back_to_start_column_logs_nothing() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("b"))).expect("start");
    assert!(session.over(&mut fx.board, &DropTarget::Column(fx.done.clone()), Placement::Before));
    assert!(session.over(&mut fx.board, &DropTarget::Card(key("c")), Placement::Before));
    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Card(key("b"))), &fx.logger)
        .expect("end");
    assert_eq!(outcome, DragOutcome::Unchanged);
    assert_eq!(titles(&fx.board, 0), ["a", "b", "c"]);
    assert!(fx.board.activity_log.is_empty());
    assert!(fx.board.cards().all(|c| c.history.is_empty()));
}

#[test]
fn cancelled_drag_restores_start_position() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("a"))).expect("start");
    assert_eq!(session.start_position(), Some((&fx.todo, 0)));
    assert!(session.over(&mut fx.board, &DropTarget::Card(key("d")), Placement::Before));
    let outcome = session.end(&mut fx.board, None, &fx.logger).expect("end");
    assert_eq!(outcome, DragOutcome::Cancelled);
    assert_eq!(titles(&fx.board, 0), ["a", "b", "c"]);
    assert_eq!(titles(&fx.board, 1), ["d"]);
    assert_eq!(fx.board.card(&key("a")).expect("a").column_id, fx.todo);
    assert!(fx.board.activity_log.is_empty());
}

#[test]
fn column_drag_reorders_and_preserves_set() {
    let mut fx = fixture();
    let session =
        DragSession::start(&fx.board, DragItem::Column(fx.done.clone())).expect("start");
    assert!(!session.over(&mut fx.board, &DropTarget::Card(key("a")), Placement::Before));
    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Card(key("a"))), &fx.logger)
        .expect("end");
    assert_eq!(
        outcome,
        DragOutcome::ColumnsReordered {
            column: fx.done.clone(),
            from: 2,
            to: 0,
        }
    );
    let order: Vec<_> = fx.board.columns.iter().map(|c| c.id.clone()).collect();
    assert_eq!(order, [fx.done.clone(), fx.todo.clone(), fx.doing.clone()]);
    assert!(fx.board.activity_log.is_empty());
}

#[test]
fn starting_a_drag_on_a_missing_item_fails() {
    let fx = fixture();
    assert!(matches!(
        DragSession::start(&fx.board, DragItem::Card(key("zz"))),
        Err(ClientError::CardNotFound(_))
    ));
    assert!(matches!(
        DragSession::start(&fx.board, DragItem::Column(ColumnKey::from("col-zz"))),
        Err(ClientError::ColumnNotFound(_))
    ));
}

#[test]
fn move_card_to_index_in_other_column() {
    let mut fx = fixture();
    let outcome = move_card(&mut fx.board, &key("c"), &fx.doing, Some(0), &fx.logger)
        .expect("move");
    assert!(matches!(outcome, DragOutcome::CardMoved { index: 0, .. }));
    assert_eq!(titles(&fx.board, 1), ["c", "d"]);
    assert_eq!(fx.board.activity_log.len(), 1);
}

#[test]
fn move_card_within_column_to_index() {
    let mut fx = fixture();
    move_card(&mut fx.board, &key("c"), &fx.todo, Some(0), &fx.logger).expect("move");
    assert_eq!(titles(&fx.board, 0), ["c", "a", "b"]);
    move_card(&mut fx.board, &key("c"), &fx.todo, None, &fx.logger).expect("move");
    assert_eq!(titles(&fx.board, 0), ["a", "b", "c"]);
    assert!(fx.board.activity_log.is_empty());
}

#[test]
fn move_column_clamps_index() {
    let mut fx = fixture();
    let outcome = move_column(&mut fx.board, &fx.todo, 10).expect("move");
    assert_eq!(
        outcome,
        DragOutcome::ColumnsReordered {
            column: fx.todo.clone(),
            from: 0,
            to: 2,
        }
    );
    assert_eq!(fx.board.columns[2].id, fx.todo);
    assert_eq!(
        move_column(&mut fx.board, &fx.todo, 2).expect("move"),
        DragOutcome::Unchanged
    );
}

#[test]
fn move_out_of_removed_list_names_a_placeholder() {
    let mut fx = fixture();
    let session = DragSession::start(&fx.board, DragItem::Card(key("a"))).expect("start");
    assert!(session.over(&mut fx.board, &DropTarget::Column(fx.done.clone()), Placement::Before));
    fx.board.columns.retain(|c| c.id != fx.todo);

    let outcome = session
        .end(&mut fx.board, Some(&DropTarget::Column(fx.done.clone())), &fx.logger)
        .expect("end");
    assert!(matches!(outcome, DragOutcome::CardMoved { .. }));
    let moved = fx.board.card(&key("a")).expect("card");
    assert_eq!(
        moved.history.last().map(|e| e.message.as_str()),
        Some("Moved from **another list** to **Done**")
    );
    assert_eq!(
        fx.board.activity_log[0].message,
        "Moved \"a\" from **another list** to **Done**"
    );
}
