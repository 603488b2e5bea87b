//! Turning generated card content into a fresh deck.

use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::generate::RawCard;
use crate::models::{today, Card, Deck};

/// Build a deck from generated cards, dated today.
pub fn assemble_deck(
    name: impl Into<String>,
    description: impl Into<String>,
    raw_cards: Vec<RawCard>,
) -> Result<Deck> {
    assemble_deck_on(name, description, raw_cards, today())
}

/// Build a deck whose cards are all new and due on `today`.
///
/// Every raw card needs a non-empty question and answer; nothing is repaired.
/// An empty input still yields an empty deck.
pub fn assemble_deck_on(
    name: impl Into<String>,
    description: impl Into<String>,
    raw_cards: Vec<RawCard>,
    today: NaiveDate,
) -> Result<Deck> {
    for (index, raw) in raw_cards.iter().enumerate() {
        if raw.question.trim().is_empty() {
            return Err(Error::InvalidCard { index, field: "question" });
        }
        if raw.answer.trim().is_empty() {
            return Err(Error::InvalidCard { index, field: "answer" });
        }
    }

    let mut deck = Deck::new(name.into(), description.into());
    deck.cards = raw_cards
        .into_iter()
        .map(|raw| Card::from_raw(raw, today))
        .collect();
    deck.refresh_counters(today);

    if deck.cards.is_empty() {
        warn!("deck '{}' was generated without any cards", deck.name);
    } else {
        info!("assembled deck '{}' with {} cards", deck.name, deck.total);
    }

    Ok(deck)
}

/// Deck name for a source document: its file name without the extension.
pub fn default_deck_name(source: &Path) -> String {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Generated Deck".to_string())
}

pub fn default_description(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("Generated from {}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assemble_seeds_scheduling_state() {
        let today = date(2024, 4, 2);
        let raw = vec![
            RawCard::new("Q1", "A1"),
            RawCard::new("Q2", "A2").with_keyword("volcano"),
            RawCard::new("Q3", "A3"),
        ];

        let deck = assemble_deck_on("Geology", "Generated from rocks.pdf", raw, today).unwrap();

        assert_eq!(deck.name, "Geology");
        assert_eq!(deck.description, "Generated from rocks.pdf");
        assert_eq!(deck.total, 3);
        assert_eq!(deck.due, 3);
        assert_eq!(deck.learned, 0);
        assert!(!deck.studied);
        assert_eq!(deck.cards[1].keyword.as_deref(), Some("volcano"));

        let ids: HashSet<_> = deck.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(deck.id.as_str()));

        for card in &deck.cards {
            assert_eq!(card.repetitions, 0);
            assert_eq!(card.interval, 0);
            assert_eq!(card.ease_factor, 2.5);
            assert_eq!(card.due, today);
            assert_eq!(card.point, 0);
        }
    }

    #[test]
    fn test_assemble_empty_is_valid() {
        let deck = assemble_deck("Empty", "", Vec::new()).unwrap();
        assert_eq!(deck.total, 0);
        assert_eq!(deck.due, 0);
        assert_eq!(deck.learned, 0);
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_assemble_rejects_blank_fields() {
        let raw = vec![RawCard::new("Q1", "A1"), RawCard::new("Q2", "  ")];
        let err = assemble_deck("Bad", "", raw).unwrap_err();
        assert!(matches!(err, Error::InvalidCard { index: 1, field: "answer" }));

        let raw = vec![RawCard::new("", "A1")];
        let err = assemble_deck("Bad", "", raw).unwrap_err();
        assert!(matches!(err, Error::InvalidCard { index: 0, field: "question" }));
    }

    #[test]
    fn test_default_names_from_source() {
        let path = Path::new("/tmp/uploads/Cell Biology.pdf");
        assert_eq!(default_deck_name(path), "Cell Biology");
        assert_eq!(default_description(path), "Generated from Cell Biology.pdf");
        assert_eq!(default_deck_name(Path::new("/")), "Generated Deck");
    }
}
