//! Durable Progress
//!
//! Loads and saves the two durable entities of the match game (level
//! progress and medal counters) and broadcasts a payload-free signal
//! whenever the counters change.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::core::codec;
use crate::core::store::{KeyValueStore, SharedStore};
use crate::game::level::{LevelBoard, LevelProgress};
use crate::game::medal::MedalTier;

/// Store key for level progress.
pub const LEVELS_KEY: &str = "match_levels_progress";

/// Store key for medal counters.
pub const MEDAL_COUNTS_KEY: &str = "match_medal_counts";

/// Change-notification signal for medal counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MedalCountsChanged;

/// Per-tier medal counters. `MedalTier::None` is never counted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MedalCounts(BTreeMap<MedalTier, u32>);

impl Default for MedalCounts {
    fn default() -> Self {
        Self(MedalTier::EARNABLE.into_iter().map(|tier| (tier, 0)).collect())
    }
}

impl MedalCounts {
    /// Counter for `tier`.
    pub fn get(&self, tier: MedalTier) -> u32 {
        self.0.get(&tier).copied().unwrap_or(0)
    }

    /// Bump `tier` by one. Returns false for `None`.
    pub fn increment(&mut self, tier: MedalTier) -> bool {
        if !tier.is_earned() {
            return false;
        }
        let count = self.0.entry(tier).or_insert(0);
        *count = count.saturating_add(1);
        true
    }

    /// Sum over all tiers.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Iterate `(tier, count)` lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = (MedalTier, u32)> + '_ {
        self.0.iter().map(|(tier, count)| (*tier, *count))
    }

    /// Persisted shape: tier name to count.
    fn to_raw(&self) -> BTreeMap<&'static str, u32> {
        self.0.iter().map(|(tier, count)| (tier.name(), *count)).collect()
    }

    /// Build from the persisted shape; unknown keys and `none` are ignored.
    fn from_raw(raw: BTreeMap<String, u32>) -> Self {
        let mut counts = Self::default();
        for (key, value) in raw {
            match key.parse::<MedalTier>() {
                Ok(tier) if tier.is_earned() => {
                    counts.0.insert(tier, value);
                }
                _ => debug!("Ignoring medal counter key {:?}", key),
            }
        }
        counts
    }
}

/// Load level progress, falling back to the default board.
pub fn load_levels(store: &dyn KeyValueStore) -> LevelBoard {
    let Some(stored) = codec::load::<Vec<LevelProgress>>(store, LEVELS_KEY) else {
        return LevelBoard::default();
    };

    match LevelBoard::from_stored(stored) {
        Ok(board) => board,
        Err(e) => {
            warn!("Regenerating level progress: {}", e);
            LevelBoard::default()
        }
    }
}

/// Load medal counters, defaulting every tier to zero.
pub fn load_medal_counts(store: &dyn KeyValueStore) -> MedalCounts {
    codec::load::<BTreeMap<String, u32>>(store, MEDAL_COUNTS_KEY)
        .map(MedalCounts::from_raw)
        .unwrap_or_default()
}

/// Persistence handle for the session engine.
#[derive(Clone)]
pub struct ProgressStore {
    store: SharedStore,
    changes: broadcast::Sender<MedalCountsChanged>,
}

impl ProgressStore {
    /// Create a handle over `store`.
    pub fn new(store: SharedStore) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self { store, changes }
    }

    /// Load level progress.
    pub fn load_levels(&self) -> LevelBoard {
        load_levels(self.store.as_ref())
    }

    /// Load medal counters.
    pub fn load_medal_counts(&self) -> MedalCounts {
        load_medal_counts(self.store.as_ref())
    }

    /// Persist level progress (best-effort).
    pub fn save_levels(&self, board: &LevelBoard) {
        codec::save(self.store.as_ref(), LEVELS_KEY, &board.levels());
    }

    /// Persist medal counters (best-effort) and notify observers.
    pub fn save_medal_counts(&self, counts: &MedalCounts) {
        codec::save(self.store.as_ref(), MEDAL_COUNTS_KEY, &counts.to_raw());
        // No receivers is fine
        let _ = self.changes.send(MedalCountsChanged);
    }

    /// Subscribe to medal-counter change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<MedalCountsChanged> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn test_missing_progress_defaults() {
        let store = MemoryStore::new();
        let board = load_levels(&store);
        assert_eq!(board, LevelBoard::default());
    }

    #[test]
    fn test_wrong_count_regenerates() {
        let store = MemoryStore::new();
        let three: Vec<_> = (1..=3).map(LevelProgress::fresh).collect();
        codec::save(&store, LEVELS_KEY, &three);

        assert_eq!(load_levels(&store), LevelBoard::default());
    }

    #[test]
    fn test_levels_roundtrip() {
        let store = MemoryStore::new();
        let progress = ProgressStore::new(store.shared());

        let mut board = LevelBoard::default();
        board.record_success(0, MedalTier::Silver);
        progress.save_levels(&board);

        assert_eq!(progress.load_levels(), board);
    }

    #[test]
    fn test_counts_ignore_unknown_keys() {
        let store = MemoryStore::new();
        store
            .set(MEDAL_COUNTS_KEY, br#"{"gold":3,"none":9,"platinum":1}"#)
            .unwrap();

        let counts = load_medal_counts(&store);
        assert_eq!(counts.get(MedalTier::Gold), 3);
        assert_eq!(counts.get(MedalTier::Bronze), 0);
        assert_eq!(counts.get(MedalTier::None), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_unreadable_counts_default_to_zero() {
        let store = MemoryStore::new();
        store.set(MEDAL_COUNTS_KEY, b"[1,2,3]").unwrap();
        assert_eq!(load_medal_counts(&store), MedalCounts::default());
    }

    #[test]
    fn test_increment_skips_none() {
        let mut counts = MedalCounts::default();
        assert!(!counts.increment(MedalTier::None));
        assert!(counts.increment(MedalTier::Diamond));
        assert_eq!(counts.total(), 1);
    }

    #[tokio::test]
    async fn test_save_counts_notifies() {
        let progress = ProgressStore::new(MemoryStore::new().shared());
        let mut rx = progress.subscribe();

        let mut counts = MedalCounts::default();
        counts.increment(MedalTier::Bronze);
        progress.save_medal_counts(&counts);

        assert_eq!(rx.recv().await.unwrap(), MedalCountsChanged);
        assert_eq!(progress.load_medal_counts().get(MedalTier::Bronze), 1);
    }
}
