//! Live card collection with copy-on-write snapshots.

use crate::{Card, CardId, CardSet};
use grimorio_error::{CardError, CardErrorKind, GrimorioResult};
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The card collection owned by the embedding application.
///
/// Readers take an `Arc<CardSet>` snapshot; writers build a new set and swap
/// it in. A snapshot handed to a resolution is never modified by later
/// edits.
///
/// # Example
///
/// ```
/// use grimorio_core::{Card, TemplateStore};
///
/// let store = TemplateStore::default();
/// store.upsert(Card::template("c-1", "saludo", "Hola")).unwrap();
///
/// let before = store.snapshot();
/// store.upsert(Card::template("c-1", "saludo", "Buenas")).unwrap();
///
/// assert_eq!(before.get_by_key("saludo").unwrap().body(), "Hola");
/// assert_eq!(store.get_by_key("saludo").unwrap().body(), "Buenas");
/// ```
#[derive(Debug, Default)]
pub struct TemplateStore {
    current: RwLock<Arc<CardSet>>,
    version: AtomicU64,
}

impl TemplateStore {
    /// Create a store holding `cards`.
    pub fn new(cards: CardSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(cards)),
            version: AtomicU64::new(0),
        }
    }

    /// Create a store from loose cards, validating keys and ids.
    pub fn from_cards(cards: Vec<Card>) -> GrimorioResult<Self> {
        Ok(Self::new(CardSet::new(cards)?))
    }

    /// Current point-in-time card set.
    pub fn snapshot(&self) -> Arc<CardSet> {
        Arc::clone(&self.current.read())
    }

    /// Look up a card by key in the current set.
    pub fn get_by_key(&self, key: &str) -> Option<Card> {
        self.snapshot().get_by_key(key).cloned()
    }

    /// Look up a card by id in the current set.
    pub fn get_by_id(&self, id: &CardId) -> Option<Card> {
        self.snapshot().get_by_id(id).cloned()
    }

    /// All cards in the current set.
    pub fn all(&self) -> Vec<Card> {
        self.snapshot().all().to_vec()
    }

    /// Number of successful mutations since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Insert a card, or replace the card with the same id.
    ///
    /// Returns the replaced card. Fails if the key belongs to another card.
    #[instrument(skip(self, card), fields(id = %card.id(), key = %card.key()))]
    pub fn upsert(&self, card: Card) -> GrimorioResult<Option<Card>> {
        let mut current = self.current.write();

        let mut cards = current.all().to_vec();
        let replaced = match cards.iter().position(|c| c.id() == card.id()) {
            Some(index) => Some(std::mem::replace(&mut cards[index], card)),
            None => {
                cards.push(card);
                None
            }
        };

        *current = Arc::new(CardSet::new(cards)?);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, replaced = replaced.is_some(), "Upserted card");
        Ok(replaced)
    }

    /// Remove a card by id, returning it.
    #[instrument(skip(self), fields(id = %id))]
    pub fn remove(&self, id: &CardId) -> GrimorioResult<Card> {
        let mut current = self.current.write();

        let mut cards = current.all().to_vec();
        let index = cards
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| CardError::new(CardErrorKind::NotFound(id.to_string())))?;
        let removed = cards.remove(index);

        *current = Arc::new(CardSet::new(cards)?);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, "Removed card");
        Ok(removed)
    }

    /// Replace every card at once.
    #[instrument(skip(self, cards), fields(count = cards.len()))]
    pub fn replace_all(&self, cards: Vec<Card>) -> GrimorioResult<()> {
        let set = CardSet::new(cards)?;
        let mut current = self.current.write();
        *current = Arc::new(set);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(version, cards = current.len(), "Replaced card set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_rejects_key_collision() {
        let store = TemplateStore::default();
        store.upsert(Card::template("c-1", "saludo", "Hola")).unwrap();

        assert!(store.upsert(Card::template("c-2", "saludo", "Otro")).is_err());
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_upsert_can_rename_key() {
        let store = TemplateStore::default();
        store.upsert(Card::template("c-1", "saludo", "Hola")).unwrap();
        let replaced = store.upsert(Card::template("c-1", "bienvenida", "Hola")).unwrap();

        assert_eq!(replaced.unwrap().key(), "saludo");
        assert!(store.get_by_key("saludo").is_none());
        assert!(store.get_by_key("bienvenida").is_some());
    }

    #[test]
    fn test_remove() {
        let store = TemplateStore::from_cards(vec![
            Card::template("c-1", "a", "x"),
            Card::template("c-2", "b", "y"),
        ])
        .unwrap();

        let removed = store.remove(&CardId::new("c-1")).unwrap();
        assert_eq!(removed.key(), "a");
        assert_eq!(store.all().len(), 1);
        assert!(store.remove(&CardId::new("c-1")).is_err());
    }

    #[test]
    fn test_snapshot_isolated_from_replace_all() {
        let store = TemplateStore::from_cards(vec![Card::template("c-1", "a", "x")]).unwrap();
        let snapshot = store.snapshot();

        store
            .replace_all(vec![Card::template("c-9", "z", "w")])
            .unwrap();

        assert!(snapshot.get_by_key("a").is_some());
        assert!(store.get_by_key("a").is_none());
        assert_eq!(store.get_by_id(&CardId::new("c-9")).unwrap().body(), "w");
    }
}
