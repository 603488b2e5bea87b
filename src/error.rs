//! Error types for the deck store and scheduler.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Review grade outside the 0-5 scale.
    #[error("quality {0} is outside the 0-5 review scale")]
    InvalidQuality(i64),

    /// Generated card content with a missing question or answer.
    #[error("generated card {index} has an empty {field}")]
    InvalidCard { index: usize, field: &'static str },

    #[error("model output is not a JSON card list: {0}")]
    MalformedModelOutput(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Card {card_id} not found in deck {deck_id}")]
    CardNotFound { deck_id: String, card_id: String },

    /// The snapshot is unreadable and could not be moved aside, so it is left
    /// untouched rather than replaced.
    #[error("deck store {0:?} is unreadable and could not be backed up")]
    StorageCorrupt(PathBuf),

    #[error("timed out after {0:?} waiting for the deck store lock")]
    LockTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
