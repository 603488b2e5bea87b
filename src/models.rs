//! Data models for flashcards and decks.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generate::RawCard;
use crate::sm2::{Quality, INITIAL_EASE_FACTOR};

/// Current calendar date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The three review buttons offered to a learner.
///
/// The scheduler works on the 0-5 quality scale; this is the translation
/// table from buttons onto that scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
    Forgot,
    Hard,
    Easy,
}

impl ReviewRating {
    pub const ALL: [ReviewRating; 3] = [Self::Forgot, Self::Hard, Self::Easy];

    /// SM-2 quality grade this button stands for.
    pub fn quality(&self) -> Quality {
        match self {
            Self::Forgot => Quality::FORGOT,
            Self::Hard => Quality::HARD,
            Self::Easy => Quality::EASY,
        }
    }

    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Forgot),
            '2' => Some(Self::Hard),
            '3' => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "forgot" | "again" => Some(Self::Forgot),
            "hard" => Some(Self::Hard),
            "easy" => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Forgot => "Forgot",
            Self::Hard => "Hard",
            Self::Easy => "Easy",
        }
    }
}

/// A single flashcard.
///
/// Key names follow the `decks.json` layout written by the generator; the
/// long-form names are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub image: Option<String>,

    // SM-2 fields
    pub repetitions: u32,
    #[serde(alias = "intervalDays")]
    pub interval: u32,
    #[serde(rename = "ef", alias = "easinessFactor")]
    pub ease_factor: f64,
    #[serde(alias = "dueDate")]
    pub due: NaiveDate,

    #[serde(default)]
    pub point: i64,
}

impl Card {
    pub fn new(question: String, answer: String, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            answer,
            keyword: None,
            image: None,
            repetitions: 0,
            interval: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            due: today,
            point: 0,
        }
    }

    pub fn from_raw(raw: RawCard, today: NaiveDate) -> Self {
        let mut card = Self::new(raw.question, raw.answer, today);
        card.keyword = raw.keyword;
        card.image = raw.image;
        card
    }

    pub fn is_new(&self) -> bool {
        self.repetitions == 0 && self.interval == 0
    }

    /// At least one successful recall in the current streak.
    pub fn is_learned(&self) -> bool {
        self.repetitions > 0
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due <= today
    }
}

/// Statistics for a deck.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeckStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub due_cards: usize,
    pub learning_cards: usize,
    pub mature_cards: usize,
}

/// A collection of flashcards generated from one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub studied: bool,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub learned: usize,
    /// Number of cards due, as of the last counter refresh.
    #[serde(default)]
    pub due: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            studied: false,
            total: 0,
            learned: 0,
            due: 0,
            summary: None,
            cards: Vec::new(),
        }
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    pub fn get_due_cards(&self, today: NaiveDate) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.is_due(today)).collect()
    }

    /// Recompute the cached `total`, `learned` and `due` counters from the cards.
    pub fn refresh_counters(&mut self, today: NaiveDate) {
        self.total = self.cards.len();
        self.learned = self.cards.iter().filter(|c| c.is_learned()).count();
        self.due = self.cards.iter().filter(|c| c.is_due(today)).count();
    }

    pub fn get_stats(&self, today: NaiveDate) -> DeckStats {
        let mut stats = DeckStats {
            total_cards: self.cards.len(),
            ..Default::default()
        };

        for card in &self.cards {
            if card.is_new() {
                stats.new_cards += 1;
            } else if card.interval >= 21 {
                stats.mature_cards += 1;
            } else {
                stats.learning_cards += 1;
            }

            if card.is_due(today) {
                stats.due_cards += 1;
            }
        }

        stats
    }
}
