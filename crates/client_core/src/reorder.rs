use tracing::debug;

use crate::{
    error::{ClientError, Result},
    history::{messages, HistoryLogger},
    model::{Board, CardKey, ColumnKey},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Card(CardKey),
    Column(ColumnKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Card(CardKey),
    Column(ColumnKey),
}

/// Which half of a hovered card the pointer is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Cancelled,
    Unchanged,
    ColumnsReordered {
        column: ColumnKey,
        from: usize,
        to: usize,
    },
    CardReordered {
        card: CardKey,
        column: ColumnKey,
        from: usize,
        to: usize,
    },
    CardMoved {
        card: CardKey,
        from_column: ColumnKey,
        to_column: ColumnKey,
        index: usize,
    },
}

#[derive(Debug, Clone)]
enum Dragging {
    Card {
        card: CardKey,
        start_column: ColumnKey,
        start_index: usize,
    },
    Column(ColumnKey),
}

/// One pointer drag from pick-up to drop.
///
/// Hovering only moves cards between lists; the move is logged once, at
/// drop time, and only when the card ends up outside the list it started in.
#[derive(Debug, Clone)]
pub struct DragSession {
    dragging: Dragging,
}

impl DragSession {
    pub fn start(board: &Board, item: DragItem) -> Result<Self> {
        let dragging = match item {
            DragItem::Card(card) => {
                let (col, idx) = board
                    .card_location(&card)
                    .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
                Dragging::Card {
                    card,
                    start_column: board.columns[col].id.clone(),
                    start_index: idx,
                }
            }
            DragItem::Column(column) => {
                if board.column_index(&column).is_none() {
                    return Err(ClientError::ColumnNotFound(column));
                }
                Dragging::Column(column)
            }
        };
        Ok(Self { dragging })
    }

    pub fn item(&self) -> DragItem {
        match &self.dragging {
            Dragging::Card { card, .. } => DragItem::Card(card.clone()),
            Dragging::Column(column) => DragItem::Column(column.clone()),
        }
    }

    /// `(column, index)` the dragged card was picked up from.
    pub fn start_position(&self) -> Option<(&ColumnKey, usize)> {
        match &self.dragging {
            Dragging::Card {
                start_column,
                start_index,
                ..
            } => Some((start_column, *start_index)),
            Dragging::Column(_) => None,
        }
    }

    /// Live preview while hovering. Returns whether the board changed.
    pub fn over(&self, board: &mut Board, target: &DropTarget, placement: Placement) -> bool {
        let Dragging::Card { card, .. } = &self.dragging else {
            return false;
        };
        if matches!(target, DropTarget::Card(over) if over == card) {
            return false;
        }
        let Some(source) = board.card_location(card) else {
            return false;
        };
        let destination = match target {
            DropTarget::Card(over) => match board.card_location(over) {
                Some((col, idx)) => match placement {
                    Placement::Before => (col, idx),
                    Placement::After => (col, idx + 1),
                },
                None => return false,
            },
            DropTarget::Column(column) => match board.column_index(column) {
                Some(col) => (col, board.columns[col].cards.len()),
                None => return false,
            },
        };
        if source.0 == destination.0 {
            return false;
        }
        relocate_card(board, source, destination.0, destination.1);
        true
    }

    /// Finishes the drag. A `None` target cancels it and puts a hovered card
    /// back where it was picked up.
    pub fn end(
        self,
        board: &mut Board,
        target: Option<&DropTarget>,
        logger: &HistoryLogger,
    ) -> Result<DragOutcome> {
        let outcome = match self.dragging {
            Dragging::Column(column) => end_column_drag(board, column, target)?,
            Dragging::Card {
                card,
                start_column,
                start_index,
            } => match target {
                None => {
                    restore_card(board, &card, &start_column, start_index)?;
                    DragOutcome::Cancelled
                }
                Some(target) => {
                    end_card_drag(board, card, start_column, start_index, target, logger)?
                }
            },
        };
        debug!(?outcome, "drag finished");
        Ok(outcome)
    }
}

fn end_column_drag(
    board: &mut Board,
    column: ColumnKey,
    target: Option<&DropTarget>,
) -> Result<DragOutcome> {
    let Some(target) = target else {
        return Ok(DragOutcome::Cancelled);
    };
    let from = board
        .column_index(&column)
        .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;
    let to = match target {
        DropTarget::Column(over) => board.column_index(over),
        DropTarget::Card(over) => board.card_location(over).map(|(col, _)| col),
    };
    match to {
        Some(to) if to != from => {
            array_move(&mut board.columns, from, to);
            Ok(DragOutcome::ColumnsReordered { column, from, to })
        }
        _ => Ok(DragOutcome::Unchanged),
    }
}

fn end_card_drag(
    board: &mut Board,
    card: CardKey,
    start_column: ColumnKey,
    start_index: usize,
    target: &DropTarget,
    logger: &HistoryLogger,
) -> Result<DragOutcome> {
    let (current_col, current_idx) = board
        .card_location(&card)
        .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;

    // `None` index means "end of the list".
    let resolved = match target {
        DropTarget::Card(over) if *over == card => None,
        DropTarget::Card(over) => board
            .card_location(over)
            .map(|(col, idx)| (col, Some(idx))),
        DropTarget::Column(column) => board.column_index(column).map(|col| (col, None)),
    };

    match resolved {
        Some((target_col, index)) if target_col != current_col => {
            let index = index.unwrap_or(board.columns[target_col].cards.len());
            relocate_card(board, (current_col, current_idx), target_col, index);
        }
        Some((_, Some(index))) => {
            array_move(&mut board.columns[current_col].cards, current_idx, index);
        }
        Some((_, None)) => {
            let last = board.columns[current_col].cards.len() - 1;
            array_move(&mut board.columns[current_col].cards, current_idx, last);
        }
        None => {}
    }

    let (final_col, final_idx) = board
        .card_location(&card)
        .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
    let final_column = board.columns[final_col].id.clone();

    if final_column != start_column {
        let from_title = board
            .column(&start_column)
            .map_or(messages::UNKNOWN_LIST, |c| c.title.as_str())
            .to_string();
        let to_title = board.columns[final_col].title.clone();
        let moved = &mut board.columns[final_col].cards[final_idx];
        logger.record_card(moved, messages::card_moved(&from_title, &to_title));
        let card_title = moved.title.clone();
        logger.record_activity(
            board,
            messages::card_moved_activity(&card_title, &from_title, &to_title),
        );
        return Ok(DragOutcome::CardMoved {
            card,
            from_column: start_column,
            to_column: final_column,
            index: final_idx,
        });
    }

    if final_idx != start_index {
        Ok(DragOutcome::CardReordered {
            card,
            column: final_column,
            from: start_index,
            to: final_idx,
        })
    } else {
        Ok(DragOutcome::Unchanged)
    }
}

fn restore_card(
    board: &mut Board,
    card: &CardKey,
    start_column: &ColumnKey,
    start_index: usize,
) -> Result<()> {
    let source = board
        .card_location(card)
        .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
    let Some(start_col) = board.column_index(start_column) else {
        return Ok(());
    };
    if source != (start_col, start_index) {
        relocate_card(board, source, start_col, start_index);
    }
    Ok(())
}

/// Takes the card out of `source` and inserts it into column `target_col` at
/// `index` (clamped), keeping its `column_id` in step.
fn relocate_card(board: &mut Board, source: (usize, usize), target_col: usize, index: usize) {
    let mut card = board.columns[source.0].cards.remove(source.1);
    let target = &mut board.columns[target_col];
    card.column_id = target.id.clone();
    let index = index.min(target.cards.len());
    target.cards.insert(index, card);
}

/// Moves the element at `from` so that it ends up at `to`. Out of range
/// `from` is ignored and `to` is clamped.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Moves a card in one step: to `index` within `target_column` when given,
/// otherwise to the end of it.
pub fn move_card(
    board: &mut Board,
    card: &CardKey,
    target_column: &ColumnKey,
    index: Option<usize>,
    logger: &HistoryLogger,
) -> Result<DragOutcome> {
    let session = DragSession::start(board, DragItem::Card(card.clone()))?;
    let column = board
        .column(target_column)
        .ok_or_else(|| ClientError::ColumnNotFound(target_column.clone()))?;
    let target = match index.and_then(|i| column.cards.get(i)) {
        Some(occupant) => DropTarget::Card(occupant.id.clone()),
        None => DropTarget::Column(target_column.clone()),
    };
    session.end(board, Some(&target), logger)
}

pub fn move_column(board: &mut Board, column: &ColumnKey, to_index: usize) -> Result<DragOutcome> {
    let from = board
        .column_index(column)
        .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;
    let to = to_index.min(board.columns.len().saturating_sub(1));
    if from == to {
        return Ok(DragOutcome::Unchanged);
    }
    array_move(&mut board.columns, from, to);
    debug!(column = %column, from, to, "column moved");
    Ok(DragOutcome::ColumnsReordered {
        column: column.clone(),
        from,
        to,
    })
}

#[cfg(test)]
#[path = "tests/reorder_tests.rs"]
mod tests;
