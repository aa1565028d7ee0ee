//! Immutable, indexed card snapshot.

use crate::{Card, CardId};
use grimorio_error::{CardError, CardErrorKind, GrimorioResult};
use std::collections::HashMap;

/// Arena of cards indexed by id and key.
///
/// A resolution walks one `CardSet` from start to finish; it never changes
/// underneath it. Keys and ids are unique within a set.
#[derive(Debug, Clone, Default)]
pub struct CardSet {
    cards: Vec<Card>,
    by_key: HashMap<String, usize>,
    by_id: HashMap<CardId, usize>,
}

impl CardSet {
    /// Build a set, rejecting duplicate keys or ids and empty keys.
    ///
    /// Keys are indexed trimmed, matching how tokens are trimmed.
    pub fn new(cards: Vec<Card>) -> GrimorioResult<Self> {
        let mut by_key = HashMap::with_capacity(cards.len());
        let mut by_id = HashMap::with_capacity(cards.len());

        for (index, card) in cards.iter().enumerate() {
            let key = card.key().trim();
            if key.is_empty() {
                return Err(CardError::new(CardErrorKind::EmptyKey(card.id().to_string())).into());
            }
            if by_key.insert(key.to_string(), index).is_some() {
                return Err(CardError::new(CardErrorKind::DuplicateKey(key.to_string())).into());
            }
            if by_id.insert(card.id().clone(), index).is_some() {
                return Err(CardError::new(CardErrorKind::DuplicateId(card.id().to_string())).into());
            }
        }

        Ok(Self {
            cards,
            by_key,
            by_id,
        })
    }

    /// Look up a card by its reference key.
    pub fn get_by_key(&self, key: &str) -> Option<&Card> {
        self.by_key.get(key.trim()).map(|&index| &self.cards[index])
    }

    /// Look up a card by id.
    pub fn get_by_id(&self, id: &CardId) -> Option<&Card> {
        self.by_id.get(id).map(|&index| &self.cards[index])
    }

    /// All cards in insertion order.
    pub fn all(&self) -> &[Card] {
        &self.cards
    }

    /// Iterate over the cards.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Consume the set, returning its cards.
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}
