use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::domain::{BoardId, GroupId};
use uuid::Uuid;

/// String identifiers used by the local workspace document. Each kind keeps
/// its own prefix so persisted ids stay readable.
macro_rules! key_newtype {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

key_newtype!(GroupKey, "group");
key_newtype!(BoardKey, "board");
key_newtype!(ColumnKey, "col");
key_newtype!(CardKey, "card");
key_newtype!(TagKey, "tag");
key_newtype!(CommentKey, "comment");

pub const DEFAULT_BACKGROUND: &str = "bg-gray-100 dark:bg-gray-800";
pub const DEFAULT_COLUMN_COLOR: &str = "bg-slate-200 dark:bg-gray-700";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Words a search term may use to mean this priority.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Priority::Low => &["low", "minor"],
            Priority::Medium => &["medium", "normal"],
            Priority::High => &["high", "urgent", "critical"],
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority `{other}` (expected low, medium or high)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLogEntry {
    pub timestamp: i64,
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagKey,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentKey,
    pub user_id: String,
    pub timestamp: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardKey,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column_id: ColumnKey,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub history: Vec<HistoryLogEntry>,
}

impl Card {
    pub fn new(column_id: ColumnKey, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: CardKey::generate(),
            title: title.into(),
            description: String::new(),
            column_id,
            priority,
            tags: Vec::new(),
            comments: Vec::new(),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnKey,
    pub title: String,
    #[serde(default = "default_column_color")]
    pub color: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: ColumnKey::generate(),
            title: title.into(),
            color: color.into(),
            cards: Vec::new(),
        }
    }
}

fn default_column_color() -> String {
    DEFAULT_COLUMN_COLOR.to_string()
}

fn default_board_name() -> String {
    "My Board".to_string()
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// `card.column_id` disagrees with the column holding the card.
    StaleColumnReference {
        card: CardKey,
        recorded: ColumnKey,
        actual: ColumnKey,
    },
    DuplicateColumn(ColumnKey),
    DuplicateCard(CardKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default = "BoardKey::generate")]
    pub id: BoardKey,
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    pub columns: Vec<Column>,
    /// Newest entry first.
    #[serde(default)]
    pub activity_log: Vec<HistoryLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<BoardId>,
}

impl Board {
    pub fn new(name: impl Into<String>, group_id: GroupKey, created_at: i64) -> Self {
        Self {
            id: BoardKey::generate(),
            name: name.into(),
            background_color: default_background(),
            columns: Vec::new(),
            activity_log: Vec::new(),
            group_id: Some(group_id),
            created_at: Some(created_at),
            remote_id: None,
        }
    }

    pub fn column(&self, id: &ColumnKey) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn column_mut(&mut self, id: &ColumnKey) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    pub fn column_index(&self, id: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// `(column index, card index)` of a card.
    pub fn card_location(&self, id: &CardKey) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col_idx, column)| {
            column
                .cards
                .iter()
                .position(|card| &card.id == id)
                .map(|card_idx| (col_idx, card_idx))
        })
    }

    pub fn card(&self, id: &CardKey) -> Option<&Card> {
        let (col, idx) = self.card_location(id)?;
        self.columns[col].cards.get(idx)
    }

    pub fn card_mut(&mut self, id: &CardKey) -> Option<&mut Card> {
        let (col, idx) = self.card_location(id)?;
        self.columns[col].cards.get_mut(idx)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flat_map(|c| c.cards.iter())
    }

    pub fn check_integrity(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut columns = HashSet::new();
        let mut cards = HashSet::new();
        for column in &self.columns {
            if !columns.insert(&column.id) {
                issues.push(IntegrityIssue::DuplicateColumn(column.id.clone()));
            }
            for card in &column.cards {
                if !cards.insert(&card.id) {
                    issues.push(IntegrityIssue::DuplicateCard(card.id.clone()));
                }
                if card.column_id != column.id {
                    issues.push(IntegrityIssue::StaleColumnReference {
                        card: card.id.clone(),
                        recorded: card.column_id.clone(),
                        actual: column.id.clone(),
                    });
                }
            }
        }
        issues
    }

    /// Rewrites every `column_id` from the card's physical placement and
    /// returns how many cards were fixed.
    pub fn repair_back_references(&mut self) -> usize {
        let mut repaired = 0;
        for column in &mut self.columns {
            for card in &mut column.cards {
                if card.column_id != column.id {
                    card.column_id = column.id.clone();
                    repaired += 1;
                }
            }
        }
        repaired
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupKey,
    pub title: String,
    #[serde(default)]
    pub boards: Vec<Board>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<GroupId>,
}

impl Group {
    pub fn new(title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: GroupKey::generate(),
            title: title.into(),
            boards: Vec::new(),
            created_at,
            remote_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub active_group_id: Option<GroupKey>,
    #[serde(default)]
    pub active_board_id: Option<BoardKey>,
}

impl Workspace {
    pub fn group(&self, id: &GroupKey) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    pub fn group_mut(&mut self, id: &GroupKey) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| &g.id == id)
    }

    pub fn board(&self, id: &BoardKey) -> Option<&Board> {
        self.all_boards().find(|b| &b.id == id)
    }

    pub fn board_mut(&mut self, id: &BoardKey) -> Option<&mut Board> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.boards.iter_mut())
            .find(|b| &b.id == id)
    }

    /// The group whose `boards` holds the board.
    pub fn group_of_board(&self, id: &BoardKey) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.boards.iter().any(|b| &b.id == id))
    }

    pub fn all_boards(&self) -> impl Iterator<Item = &Board> {
        self.groups.iter().flat_map(|g| g.boards.iter())
    }
}
