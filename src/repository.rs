//! Single-writer access to the deck store.
//!
//! Every load → mutate → save cycle runs while holding one lock, so two
//! reviews against different cards can no longer overwrite each other.
//! Lock acquisition is bounded by a timeout instead of waiting forever.

use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::{today, Card, Deck};
use crate::sm2::{self, Quality};
use crate::storage::{DeckStore, LoadReport, StoreHealth};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

pub struct DeckRepository {
    store: DeckStore,
    writer: Mutex<()>,
    lock_timeout: Duration,
}

impl DeckRepository {
    pub fn new(store: DeckStore) -> Self {
        Self::with_lock_timeout(store, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(store: DeckStore, lock_timeout: Duration) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
            lock_timeout,
        }
    }

    pub fn store(&self) -> &DeckStore {
        &self.store
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer.try_lock_for(self.lock_timeout).ok_or_else(|| {
            warn!("deck store lock not acquired within {:?}", self.lock_timeout);
            Error::LockTimeout(self.lock_timeout)
        })
    }

    /// Read the collection along with how healthy the snapshot was.
    pub fn load(&self) -> Result<LoadReport> {
        let _guard = self.acquire()?;
        Ok(self.store.load())
    }

    /// Current decks with counters recomputed for today.
    pub fn decks(&self) -> Result<Vec<Deck>> {
        let mut decks = self.load()?.decks;
        let today = today();
        for deck in &mut decks {
            deck.refresh_counters(today);
        }
        Ok(decks)
    }

    pub fn deck(&self, deck_id: &str) -> Result<Deck> {
        self.decks()?
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| Error::DeckNotFound(deck_id.to_string()))
    }

    /// Run `mutate` against the full collection and save the result.
    ///
    /// Nothing is written when `mutate` fails.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Vec<Deck>) -> Result<T>) -> Result<T> {
        let (value, _) = self.modify(|decks| mutate(decks).map(|value| (value, true)))?;
        Ok(value)
    }

    /// Like `update`, but the closure also says whether it changed anything.
    /// An unchanged collection is not rewritten. Returns the health of the
    /// snapshot the mutation started from.
    fn modify<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<Deck>) -> Result<(T, bool)>,
    ) -> Result<(T, StoreHealth)> {
        let _guard = self.acquire()?;
        let LoadReport { mut decks, health } = self.store.load();

        // The store left an unreadable file in place because it could not
        // back it up. Writing now would destroy it.
        if let StoreHealth::Recovered { backup: None, .. } = health {
            error!("refusing to overwrite unpreserved deck store {:?}", self.store.path());
            return Err(Error::StorageCorrupt(self.store.path().to_path_buf()));
        }

        let (value, changed) = mutate(&mut decks)?;
        if changed {
            self.store.save_all(&decks)?;
        }
        Ok((value, health))
    }

    /// Append a freshly assembled deck. Returns the health of the snapshot it
    /// was added to, so callers can tell the user about a reset collection.
    pub fn insert_deck(&self, deck: Deck) -> Result<StoreHealth> {
        info!("storing deck '{}' ({} cards)", deck.name, deck.cards.len());
        let ((), health) = self.modify(|decks| {
            decks.push(deck);
            Ok(((), true))
        })?;
        Ok(health)
    }

    /// Delete a deck with all its cards. Returns whether it existed.
    pub fn delete_deck(&self, deck_id: &str) -> Result<bool> {
        let (removed, _) = self.modify(|decks| {
            let before = decks.len();
            decks.retain(|d| d.id != deck_id);
            let removed = decks.len() != before;
            Ok((removed, removed))
        })?;
        Ok(removed)
    }

    /// Record a review of one card as of today.
    pub fn review(&self, deck_id: &str, card_id: &str, quality: Quality) -> Result<Card> {
        self.review_on(deck_id, card_id, quality, today())
    }

    /// Record a review of one card on `today` and return its new state.
    ///
    /// A passing review earns the card one point. The deck is marked studied
    /// and its counters refreshed.
    pub fn review_on(
        &self,
        deck_id: &str,
        card_id: &str,
        quality: Quality,
        today: NaiveDate,
    ) -> Result<Card> {
        self.update(|decks| {
            let deck = decks
                .iter_mut()
                .find(|d| d.id == deck_id)
                .ok_or_else(|| Error::DeckNotFound(deck_id.to_string()))?;
            let card = deck.card_mut(card_id).ok_or_else(|| Error::CardNotFound {
                deck_id: deck_id.to_string(),
                card_id: card_id.to_string(),
            })?;

            sm2::review_card(card, quality, today);
            if quality.is_passing() {
                card.point += 1;
            }
            let reviewed = card.clone();

            deck.studied = true;
            deck.refresh_counters(today);

            debug!(
                "reviewed card {} with quality {}: interval {}d, ef {:.2}, due {}",
                reviewed.id,
                quality.value(),
                reviewed.interval,
                reviewed.ease_factor,
                reviewed.due
            );
            Ok(reviewed)
        })
    }

    /// Recompute and persist every deck's counters for `today`.
    pub fn refresh_counters(&self, today: NaiveDate) -> Result<()> {
        self.update(|decks| {
            for deck in decks.iter_mut() {
                deck.refresh_counters(today);
            }
            Ok(())
        })
    }
}
