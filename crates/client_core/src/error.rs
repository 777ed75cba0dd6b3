use shared::error::ApiError;
use thiserror::Error;

use crate::model::{BoardKey, CardKey, ColumnKey, GroupKey, TagKey};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("group {0} not found")]
    GroupNotFound(GroupKey),
    #[error("board {0} not found")]
    BoardNotFound(BoardKey),
    #[error("list {0} not found")]
    ColumnNotFound(ColumnKey),
    #[error("card {0} not found")]
    CardNotFound(CardKey),
    #[error("tag {0} not found")]
    TagNotFound(TagKey),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("comment must not be empty")]
    EmptyComment,
    #[error("{0} has not been synced to the server yet")]
    NotSynced(String),
    #[error("local storage failure: {0}")]
    Persistence(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {error}")]
    Api { status: u16, error: ApiError },
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
