//! Cards and Deck Dealing

use serde::Serialize;

use crate::core::rng::DeterministicRng;

/// Symbols a round's pairs are drawn from.
pub const SYMBOL_POOL: [&str; 18] = [
    "🍎", "🍌", "🍇", "🍒", "🥝", "🍍",
    "🥥", "🍉", "🍑", "🍓", "🍋", "🥭",
    "🥕", "🍆", "🌶", "🥦", "🥑", "🥔",
];

/// Pairs dealt per round.
pub const PAIRS_PER_ROUND: usize = 6;

/// Opaque card identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CardId(pub uuid::Uuid);

impl CardId {
    /// Draw an id from the round's RNG, so a seeded deal is fully reproducible.
    fn from_rng(rng: &mut DeterministicRng) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&rng.next_u64().to_le_bytes());
        bytes[8..].copy_from_slice(&rng.next_u64().to_le_bytes());
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// A single card on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique id within the round.
    pub id: CardId,
    /// Symbol shown when face up.
    pub content: &'static str,
    /// Currently showing its symbol.
    pub is_face_up: bool,
    /// Already paired.
    pub is_matched: bool,
}

impl Card {
    /// Face-down, unmatched card.
    pub fn new(id: CardId, content: &'static str) -> Self {
        Self {
            id,
            content,
            is_face_up: false,
            is_matched: false,
        }
    }

    /// Whether the card may be flipped by a selection.
    pub fn is_selectable(&self) -> bool {
        !self.is_face_up && !self.is_matched
    }
}

/// Deal a shuffled deck of `pairs` symbol pairs.
///
/// Symbols are drawn without replacement; the pool is doubled if a caller
/// ever asks for more pairs than it holds.
pub fn deal(rng: &mut DeterministicRng, pairs: usize) -> Vec<Card> {
    let mut symbols: Vec<&'static str> = SYMBOL_POOL.to_vec();
    rng.shuffle(&mut symbols);
    while symbols.len() < pairs {
        symbols.extend_from_within(..);
    }
    symbols.truncate(pairs);

    let mut layout: Vec<&'static str> = symbols.iter().chain(symbols.iter()).copied().collect();
    rng.shuffle(&mut layout);

    layout
        .into_iter()
        .map(|symbol| Card::new(CardId::from_rng(rng), symbol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn test_deal_six_pairs() {
        let mut rng = DeterministicRng::new(42);
        let deck = deal(&mut rng, PAIRS_PER_ROUND);
        assert_eq!(deck.len(), PAIRS_PER_ROUND * 2);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for card in &deck {
            *counts.entry(card.content).or_default() += 1;
            assert!(card.is_selectable());
        }
        assert_eq!(counts.len(), PAIRS_PER_ROUND);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_card_ids_unique() {
        let mut rng = DeterministicRng::new(3);
        let deck = deal(&mut rng, PAIRS_PER_ROUND);
        let ids: BTreeSet<CardId> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), deck.len());
    }

    #[test]
    fn test_same_seed_same_deck() {
        let a = deal(&mut DeterministicRng::new(11), PAIRS_PER_ROUND);
        let b = deal(&mut DeterministicRng::new(11), PAIRS_PER_ROUND);
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversized_request_reuses_pool() {
        let mut rng = DeterministicRng::new(5);
        let deck = deal(&mut rng, SYMBOL_POOL.len() + 2);
        assert_eq!(deck.len(), (SYMBOL_POOL.len() + 2) * 2);
    }
}
