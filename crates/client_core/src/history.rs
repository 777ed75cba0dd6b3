use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::model::{Board, Card, HistoryLogEntry};

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Stamps log entries with the acting user and the current time.
#[derive(Clone)]
pub struct HistoryLogger {
    user_id: String,
    clock: Arc<dyn Clock>,
}

impl HistoryLogger {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_clock(user_id, Arc::new(SystemClock))
    }

    pub fn with_clock(user_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_id: user_id.into(),
            clock,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn entry(&self, message: impl Into<String>) -> HistoryLogEntry {
        HistoryLogEntry {
            timestamp: self.now(),
            user_id: self.user_id.clone(),
            message: message.into(),
        }
    }

    /// Card history is kept oldest-first.
    pub fn record_card(&self, card: &mut Card, message: impl Into<String>) {
        card.history.push(self.entry(message));
    }

    /// The board feed is kept newest-first.
    pub fn record_activity(&self, board: &mut Board, message: impl Into<String>) {
        board.activity_log.insert(0, self.entry(message));
    }
}

pub mod messages {
    pub const BOARD_CREATED: &str = "Board created";
    pub const CARD_CREATED: &str = "Card created";
    /// Stands in for a list that no longer exists.
    pub const UNKNOWN_LIST: &str = "another list";

    pub fn card_created(title: &str, column: &str) -> String {
        format!("Card \"{title}\" created in {column}")
    }

    pub fn card_updated(fields: &[&str]) -> String {
        format!("Updated {}", fields.join(", "))
    }

    pub fn card_updated_activity(fields: &[&str], old_title: &str) -> String {
        format!("Updated {} of \"{old_title}\"", fields.join(", "))
    }

    pub fn card_deleted(title: &str) -> String {
        format!("Deleted card \"{title}\"")
    }

    pub fn column_added(title: &str) -> String {
        format!("Added list \"{title}\"")
    }

    pub fn column_deleted(title: &str) -> String {
        format!("Deleted list \"{title}\"")
    }

    pub fn column_renamed(title: &str) -> String {
        format!("Renamed list to \"{title}\"")
    }

    pub fn card_moved(from: &str, to: &str) -> String {
        format!("Moved from **{from}** to **{to}**")
    }

    pub fn card_moved_activity(title: &str, from: &str, to: &str) -> String {
        format!("Moved \"{title}\" from **{from}** to **{to}**")
    }

    pub fn tag_added(title: &str, tag: &str) -> String {
        format!("Tagged \"{title}\" with **{tag}**")
    }

    pub fn tag_removed(title: &str, tag: &str) -> String {
        format!("Removed tag **{tag}** from \"{title}\"")
    }

    pub fn comment_added(title: &str) -> String {
        format!("Commented on \"{title}\"")
    }
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Short human label for how long ago `timestamp` happened.
pub fn format_relative(timestamp: i64, now: i64) -> String {
    let elapsed = now - timestamp;
    if elapsed < MINUTE_MS {
        return "just now".to_string();
    }
    if elapsed < HOUR_MS {
        return format!("{} min ago", elapsed / MINUTE_MS);
    }
    if elapsed < DAY_MS {
        return format!("{}h ago", elapsed / HOUR_MS);
    }
    if elapsed < 7 * DAY_MS {
        return format!("{}d ago", elapsed / DAY_MS);
    }

    let (Some(at), Some(current)) = (
        DateTime::<Utc>::from_timestamp_millis(timestamp),
        DateTime::<Utc>::from_timestamp_millis(now),
    ) else {
        return String::new();
    };
    if at.year() == current.year() {
        at.format("%-d %b").to_string()
    } else {
        at.format("%-d %b %Y").to_string()
    }
}

pub fn sorted_newest_first(entries: &[HistoryLogEntry]) -> Vec<HistoryLogEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}


#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
