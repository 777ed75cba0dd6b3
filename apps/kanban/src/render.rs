use std::fmt::Write;

use client_core::{
    history::{format_relative, sorted_newest_first},
    markup::plain_text,
    model::{Board, Card, HistoryLogEntry, Workspace},
    stats::BoardStatistics,
    DragOutcome,
};

pub fn groups(workspace: &Workspace) -> String {
    let mut out = String::new();
    for group in &workspace.groups {
        let marker = active_marker(workspace.active_group_id.as_ref() == Some(&group.id));
        let _ = writeln!(
            out,
            "{marker} {}  {}  ({} board(s))",
            group.id,
            group.title,
            group.boards.len()
        );
    }
    out
}

pub fn boards(workspace: &Workspace) -> String {
    let mut out = String::new();
    for group in &workspace.groups {
        let _ = writeln!(out, "{}", group.title);
        for board in &group.boards {
            let marker = active_marker(workspace.active_board_id.as_ref() == Some(&board.id));
            let _ = writeln!(out, "  {marker} {}  {}", board.id, board.name);
        }
    }
    out
}

pub fn board(board: &Board) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", board.name, board.id);
    for column in &board.columns {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "== {} [{}] ({})",
            column.title,
            column.cards.len(),
            column.id
        );
        for card in &column.cards {
            let tags: Vec<_> = card.tags.iter().map(|t| format!("#{}", t.name)).collect();
            let _ = writeln!(
                out,
                "  - {} [{}] {} {}",
                card.title,
                card.priority,
                tags.join(" "),
                card.id
            );
        }
    }
    out
}

pub fn card(card: &Card, now: i64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", card.title, card.id);
    let _ = writeln!(out, "priority: {}", card.priority);
    if !card.description.is_empty() {
        let _ = writeln!(out, "\n{}\n", card.description);
    }
    for tag in &card.tags {
        let _ = writeln!(out, "tag: {} ({})", tag.name, tag.id);
    }
    for comment in &card.comments {
        let _ = writeln!(
            out,
            "{} · {}: {}",
            format_relative(comment.timestamp, now),
            comment.user_id,
            comment.text
        );
    }
    out.push_str(&history(&card.history, now));
    out
}

pub fn history(entries: &[HistoryLogEntry], now: i64) -> String {
    let mut out = String::new();
    for entry in sorted_newest_first(entries) {
        let _ = writeln!(
            out,
            "{:>10}  {}  {}",
            format_relative(entry.timestamp, now),
            entry.user_id,
            plain_text(&entry.message)
        );
    }
    out
}

pub fn statistics(stats: &BoardStatistics) -> String {
    let mut out = String::new();
    for column in &stats.columns {
        let _ = writeln!(out, "{:<20} {}", column.title, column.count);
    }
    let _ = writeln!(
        out,
        "{} of {} card(s) done ({}%)",
        stats.completed, stats.total, stats.percent_complete
    );
    out
}

pub fn outcome(outcome: &DragOutcome) -> String {
    match outcome {
        DragOutcome::Cancelled | DragOutcome::Unchanged => "nothing moved".to_string(),
        DragOutcome::ColumnsReordered { from, to, .. } => format!("list moved from {from} to {to}"),
        DragOutcome::CardReordered { from, to, .. } => format!("card moved from {from} to {to}"),
        DragOutcome::CardMoved { to_column, index, .. } => {
            format!("card moved to {to_column} at {index}")
        }
    }
}

fn active_marker(active: bool) -> char {
    if active {
        '*'
    } else {
        ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{
        model::{Column, GroupKey, Priority, DEFAULT_COLUMN_COLOR},
        stats::board_statistics,
    };

    #[test]
    fn board_lists_columns_and_cards() {
        let mut board = Board::new("Launch", GroupKey::from("group-1"), 0);
        let mut todo = Column::new("To Do", DEFAULT_COLUMN_COLOR);
        todo.cards
            .push(Card::new(todo.id.clone(), "Ship", Priority::High));
        board.columns.push(todo);

        let text = super::board(&board);
        assert!(text.contains("== To Do [1]"));
        assert!(text.contains("- Ship [high]"));
    }

    #[test]
    fn history_strips_markup() {
        let entry = HistoryLogEntry {
            timestamp: 0,
            user_id: "ana".into(),
            message: "Moved from **A** to **B**".into(),
        };
        let text = history(&[entry], 30_000);
        assert!(text.contains("just now"));
        assert!(text.contains("Moved from A to B"));
    }

    #[test]
    fn statistics_summary_line() {
        let board = Board::new("Empty", GroupKey::from("group-1"), 0);
        let text = statistics(&board_statistics(&board));
        assert_eq!(text, "0 of 0 card(s) done (0%)\n");
    }
}
