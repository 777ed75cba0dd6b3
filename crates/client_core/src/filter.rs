use crate::model::{Board, Card, Column, Priority};

/// Copy of `board` keeping only the cards that match `term`. Every list is
/// kept, even when it ends up empty.
pub fn filter_board(board: &Board, term: &str) -> Board {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return board.clone();
    }
    let columns = board
        .columns
        .iter()
        .map(|column| Column {
            cards: column
                .cards
                .iter()
                .filter(|card| card_matches(card, column, &term))
                .cloned()
                .collect(),
            ..column.clone()
        })
        .collect();
    Board {
        columns,
        ..board.clone()
    }
}

/// `term` must already be lowercase.
pub fn card_matches(card: &Card, column: &Column, term: &str) -> bool {
    card.title.to_lowercase().contains(term)
        || card.description.to_lowercase().contains(term)
        || card
            .tags
            .iter()
            .any(|tag| tag.name.to_lowercase().contains(term))
        || column.title.to_lowercase().contains(term)
        || priority_matches(card.priority, term)
}

fn priority_matches(priority: Priority, term: &str) -> bool {
    priority
        .synonyms()
        .iter()
        .any(|word| word.contains(term) || term.contains(word))
}
