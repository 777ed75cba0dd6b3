use serde::Serialize;

use crate::model::Board;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCount {
    pub title: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStatistics {
    pub columns: Vec<ColumnCount>,
    pub total: usize,
    pub completed: usize,
    pub percent_complete: u32,
}

pub fn board_statistics(board: &Board) -> BoardStatistics {
    let columns: Vec<ColumnCount> = board
        .columns
        .iter()
        .map(|column| ColumnCount {
            title: column.title.clone(),
            count: column.cards.len(),
        })
        .collect();
    let total: usize = columns.iter().map(|c| c.count).sum();
    // The first list named like a "done" list counts as completed work.
    let completed = board
        .columns
        .iter()
        .find(|column| {
            let title = column.title.to_lowercase();
            title.contains("done") || title.contains("completed")
        })
        .map_or(0, |column| column.cards.len());
    let percent_complete = if total == 0 {
        0
    } else {
        (completed as f64 * 100.0 / total as f64).round() as u32
    };
    BoardStatistics {
        columns,
        total,
        completed,
        percent_complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, Column, GroupKey, Priority, DEFAULT_COLUMN_COLOR};

    fn board_with(counts: &[(&str, usize)]) -> Board {
        let mut board = Board::new("Launch", GroupKey::from("group-1"), 0);
        for (title, count) in counts {
            let mut column = Column::new(*title, DEFAULT_COLUMN_COLOR);
            for n in 0..*count {
                let card = Card::new(column.id.clone(), format!("card {n}"), Priority::Medium);
                column.cards.push(card);
            }
            board.columns.push(column);
        }
        board
    }

    #[test]
    fn counts_cards_per_column_and_completion() {
        let stats = board_statistics(&board_with(&[("To Do", 2), ("In Progress", 0), ("Done", 1)]));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.percent_complete, 33);
        assert_eq!(stats.columns[0], ColumnCount { title: "To Do".into(), count: 2 });
    }

    #[test]
    fn empty_board_is_zero_percent() {
        let stats = board_statistics(&board_with(&[("To Do", 0), ("Done", 0)]));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percent_complete, 0);
    }

    #[test]
    fn completed_list_name_is_recognised() {
        let stats = board_statistics(&board_with(&[("Backlog", 1), ("Completed", 2), ("Done", 1)]));
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.percent_complete, 50);
    }

    #[test]
    fn board_without_done_list_has_nothing_completed() {
        let stats = board_statistics(&board_with(&[("Ideas", 4)]));
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.percent_complete, 0);
    }
}
