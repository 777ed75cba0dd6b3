use tracing::debug;

use crate::{
    error::{ClientError, Result},
    history::{messages, HistoryLogger},
    model::{
        Board, Card, CardKey, Column, ColumnKey, Comment, CommentKey, Priority, Tag, TagKey,
        DEFAULT_COLUMN_COLOR,
    },
};

/// Editable card fields, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Description,
    Priority,
}

impl CardField {
    pub fn label(self) -> &'static str {
        match self {
            CardField::Title => "title",
            CardField::Description => "description",
            CardField::Priority => "priority",
        }
    }
}

/// Card and column edits on one board. Every edit that users would want to
/// see in the feed is recorded through the logger.
pub struct BoardEditor<'a> {
    board: &'a mut Board,
    logger: &'a HistoryLogger,
}

impl<'a> BoardEditor<'a> {
    pub fn new(board: &'a mut Board, logger: &'a HistoryLogger) -> Self {
        Self { board, logger }
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    pub fn find_card(&self, card: &CardKey) -> Option<&Card> {
        self.board.card(card)
    }

    pub fn card_location(&self, card: &CardKey) -> Option<(usize, usize)> {
        self.board.card_location(card)
    }

    pub fn add_card(&mut self, column: &ColumnKey, title: &str) -> Result<CardKey> {
        self.create_task(column, title, Priority::Medium)
    }

    pub fn create_task(
        &mut self,
        column: &ColumnKey,
        title: &str,
        priority: Priority,
    ) -> Result<CardKey> {
        let title = non_empty(title)?;
        let logger = self.logger;
        let target = self
            .board
            .column_mut(column)
            .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;

        let mut card = Card::new(target.id.clone(), title, priority);
        logger.record_card(&mut card, messages::CARD_CREATED);
        let key = card.id.clone();
        let column_title = target.title.clone();
        target.cards.push(card);

        logger.record_activity(self.board, messages::card_created(title, &column_title));
        debug!(card = %key, column = %column, "card created");
        Ok(key)
    }

    /// Applies a title/description/priority edit. Returns the fields that
    /// actually changed; nothing is logged when that list is empty.
    pub fn edit_card(
        &mut self,
        card: &CardKey,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<Vec<CardField>> {
        let title = non_empty(title)?;
        let description = description.trim();
        let logger = self.logger;
        let target = self
            .board
            .card_mut(card)
            .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;

        let changed = changed_fields(target, title, description, priority);
        let old_title = target.title.clone();
        target.title = title.to_string();
        target.description = description.to_string();
        target.priority = priority;
        if !changed.is_empty() {
            let labels = labels(&changed);
            logger.record_card(target, messages::card_updated(&labels));
            logger.record_activity(
                self.board,
                messages::card_updated_activity(&labels, &old_title),
            );
        }
        Ok(changed)
    }

    /// Replaces a card's content from a full card value. Placement and
    /// history stay with the stored card.
    pub fn update_card(&mut self, updated: Card) -> Result<Vec<CardField>> {
        let title = non_empty(&updated.title)?.to_string();
        let logger = self.logger;
        let target = self
            .board
            .card_mut(&updated.id)
            .ok_or_else(|| ClientError::CardNotFound(updated.id.clone()))?;

        let changed = changed_fields(
            target,
            &title,
            &updated.description,
            updated.priority,
        );
        let old_title = std::mem::replace(&mut target.title, title);
        target.description = updated.description;
        target.priority = updated.priority;
        target.tags = updated.tags;
        target.comments = updated.comments;
        if !changed.is_empty() {
            let labels = labels(&changed);
            logger.record_card(target, messages::card_updated(&labels));
            logger.record_activity(
                self.board,
                messages::card_updated_activity(&labels, &old_title),
            );
        }
        Ok(changed)
    }

    pub fn delete_card(&mut self, card: &CardKey) -> Result<Card> {
        let (col, idx) = self
            .board
            .card_location(card)
            .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
        let removed = self.board.columns[col].cards.remove(idx);
        self.logger
            .record_activity(self.board, messages::card_deleted(&removed.title));
        Ok(removed)
    }

    /// Inserts a new list at `insert_index` (clamped to the end) or appends it.
    pub fn add_column(&mut self, title: &str, insert_index: Option<usize>) -> Result<ColumnKey> {
        let title = non_empty(title)?;
        let column = Column::new(title, DEFAULT_COLUMN_COLOR);
        let key = column.id.clone();
        let index = insert_index
            .unwrap_or(self.board.columns.len())
            .min(self.board.columns.len());
        self.board.columns.insert(index, column);
        self.logger
            .record_activity(self.board, messages::column_added(title));
        Ok(key)
    }

    /// Removes a list together with its cards.
    pub fn delete_column(&mut self, column: &ColumnKey) -> Result<Column> {
        let index = self
            .board
            .column_index(column)
            .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;
        let removed = self.board.columns.remove(index);
        self.logger
            .record_activity(self.board, messages::column_deleted(&removed.title));
        Ok(removed)
    }

    pub fn rename_column(&mut self, column: &ColumnKey, title: &str) -> Result<()> {
        let title = non_empty(title)?;
        let target = self
            .board
            .column_mut(column)
            .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;
        target.title = title.to_string();
        self.logger
            .record_activity(self.board, messages::column_renamed(title));
        Ok(())
    }

    pub fn set_column_color(&mut self, column: &ColumnKey, color: &str) -> Result<()> {
        let target = self
            .board
            .column_mut(column)
            .ok_or_else(|| ClientError::ColumnNotFound(column.clone()))?;
        target.color = color.to_string();
        Ok(())
    }

    pub fn add_tag(&mut self, card: &CardKey, name: &str, color: &str) -> Result<TagKey> {
        let name = non_empty(name)?;
        let target = self
            .board
            .card_mut(card)
            .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
        let tag = Tag {
            id: TagKey::generate(),
            name: name.to_string(),
            color: color.to_string(),
        };
        let key = tag.id.clone();
        target.tags.push(tag);
        let title = target.title.clone();
        self.logger
            .record_activity(self.board, messages::tag_added(&title, name));
        Ok(key)
    }

    pub fn remove_tag(&mut self, card: &CardKey, tag: &TagKey) -> Result<Tag> {
        let target = self
            .board
            .card_mut(card)
            .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
        let index = target
            .tags
            .iter()
            .position(|t| &t.id == tag)
            .ok_or_else(|| ClientError::TagNotFound(tag.clone()))?;
        let removed = target.tags.remove(index);
        let title = target.title.clone();
        self.logger
            .record_activity(self.board, messages::tag_removed(&title, &removed.name));
        Ok(removed)
    }

    pub fn add_comment(&mut self, card: &CardKey, text: &str) -> Result<CommentKey> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyComment);
        }
        let logger = self.logger;
        let target = self
            .board
            .card_mut(card)
            .ok_or_else(|| ClientError::CardNotFound(card.clone()))?;
        let comment = Comment {
            id: CommentKey::generate(),
            user_id: logger.user_id().to_string(),
            timestamp: logger.now(),
            text: text.to_string(),
        };
        let key = comment.id.clone();
        target.comments.push(comment);
        let title = target.title.clone();
        logger.record_activity(self.board, messages::comment_added(&title));
        Ok(key)
    }
}

pub(crate) fn non_empty(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        Err(ClientError::EmptyTitle)
    } else {
        Ok(title)
    }
}

fn changed_fields(card: &Card, title: &str, description: &str, priority: Priority) -> Vec<CardField> {
    let mut changed = Vec::new();
    if card.title != title {
        changed.push(CardField::Title);
    }
    if card.description != description {
        changed.push(CardField::Description);
    }
    if card.priority != priority {
        changed.push(CardField::Priority);
    }
    changed
}

fn labels(fields: &[CardField]) -> Vec<&'static str> {
    fields.iter().map(|f| f.label()).collect()
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
