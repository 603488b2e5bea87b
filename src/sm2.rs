//! SM-2 spaced repetition scheduler.
//!
//! Quality grades (0-5):
//! - 0: Complete blackout
//! - 1: Incorrect, but the answer was recognised
//! - 2: Incorrect, but the answer seemed easy to recall
//! - 3: Correct with serious difficulty
//! - 4: Correct after hesitation
//! - 5: Perfect recall
//!
//! Scheduling is a pure function of the card state, the grade and the date
//! it is applied on. Interval growth rounds half away from zero (`f64::round`).

use chrono::{Days, NaiveDate};
use log::warn;

use crate::error::{Error, Result};
use crate::models::{today, Card, ReviewRating};

/// Floor for the easiness factor, enforced on every update.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Easiness factor of a freshly generated card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// A validated review grade on the 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;
    pub const PASSING: u8 = 3;

    pub const FORGOT: Quality = Quality(1);
    pub const HARD: Quality = Quality(3);
    pub const EASY: Quality = Quality(5);

    /// Validate a raw grade, rejecting anything outside 0..=5.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidQuality(value))
        }
    }

    /// Clamp a raw grade into 0..=5, logging when it had to be adjusted.
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(0, i64::from(Self::MAX));
        if clamped != value {
            warn!("review quality {} clamped to {}", value, clamped);
        }
        Self(clamped as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the grade counts as a successful recall.
    pub fn is_passing(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<i64> for Quality {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

/// Schedule `card` as of today's date.
pub fn schedule(card: &Card, quality: Quality) -> Card {
    schedule_on(card, quality, today())
}

/// Return a copy of `card` with its scheduling state advanced by one review
/// on `today`.
pub fn schedule_on(card: &Card, quality: Quality, today: NaiveDate) -> Card {
    let mut next = card.clone();
    review_card(&mut next, quality, today);
    next
}

/// Apply one review to `card` in place. Only the scheduling fields change.
pub fn review_card(card: &mut Card, quality: Quality, today: NaiveDate) {
    if quality.is_passing() {
        card.interval = match card.repetitions {
            0 => 1,
            1 => 6,
            _ => grow_interval(card.interval, card.ease_factor),
        };
        card.repetitions += 1;
        card.ease_factor = next_ease_factor(card.ease_factor, quality);
    } else {
        // A lapse resets the streak; easiness is left alone.
        card.repetitions = 0;
        card.interval = 1;
    }

    card.due = due_after(today, card.interval);
}

/// EF' = max(1.3, EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)))
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    let adjusted = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    adjusted.max(MIN_EASE_FACTOR)
}

fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    // `as` saturates, so runaway growth pins at u32::MAX instead of wrapping.
    (f64::from(interval) * ease_factor).round() as u32
}

fn due_after(today: NaiveDate, interval: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(interval)))
        .unwrap_or(NaiveDate::MAX)
}

/// Interval each review button would give `card`, formatted for display.
pub fn preview_intervals(card: &Card) -> [(ReviewRating, String); 3] {
    let day = today();
    ReviewRating::ALL.map(|rating| {
        let next = schedule_on(card, rating.quality(), day);
        (rating, format_interval(next.interval))
    })
}

/// Format an interval in days to a short human-readable string.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
