//! Flashdeck - spaced repetition for generated flashcard decks
//!
//! Cards produced by a completion model are assembled into decks, stored as
//! one JSON collection, and scheduled for review with SM-2.

pub mod assemble;
pub mod config;
pub mod error;
pub mod generate;
pub mod models;
pub mod repository;
pub mod sm2;
pub mod storage;

pub use assemble::{assemble_deck, assemble_deck_on};
pub use error::{Error, Result};
pub use generate::{attach_images, parse_model_output, ImageSource, LocalImageDir, RawCard};
pub use models::{Card, Deck, DeckStats, ReviewRating};
pub use repository::DeckRepository;
pub use sm2::{schedule, schedule_on, Quality};
pub use storage::{DeckStore, LoadReport, StoreHealth};
