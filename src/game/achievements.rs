//! Achievements Summary
//!
//! Read-only view of the medal counters. It shares only the store and the
//! change signal with the engine, never the engine itself.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::core::store::SharedStore;
use crate::game::medal::MedalTier;
use crate::game::progress::{load_medal_counts, MedalCounts, MedalCountsChanged};

/// Aggregate medal counts for display.
pub struct AchievementsSummary {
    store: SharedStore,
    counts: MedalCounts,
}

impl AchievementsSummary {
    /// Read the current counters from `store`.
    pub fn new(store: SharedStore) -> Self {
        let counts = load_medal_counts(store.as_ref());
        Self { store, counts }
    }

    /// Re-read the counters.
    pub fn refresh(&mut self) {
        self.counts = load_medal_counts(self.store.as_ref());
    }

    /// Current counters.
    pub fn counts(&self) -> &MedalCounts {
        &self.counts
    }

    /// Count for one tier.
    pub fn count(&self, tier: MedalTier) -> u32 {
        self.counts.get(tier)
    }

    /// Earnable tiers, highest rank first.
    pub fn ordered_medals(&self) -> Vec<MedalTier> {
        MedalTier::EARNABLE.into_iter().rev().collect()
    }

    /// All medals ever earned.
    pub fn total_medals_earned(&self) -> u32 {
        self.counts.total()
    }

    /// Wait for the next change notification and refresh.
    ///
    /// Returns false once the sender side is gone. A lagged receiver
    /// refreshes once for everything it missed.
    pub async fn next_change(&mut self, changes: &mut broadcast::Receiver<MedalCountsChanged>) -> bool {
        match changes.recv().await {
            Ok(MedalCountsChanged) => {}
            Err(RecvError::Lagged(missed)) => {
                debug!("Achievements missed {} notifications", missed);
            }
            Err(RecvError::Closed) => return false,
        }
        self.refresh();
        true
    }

    /// Refresh on every change until the sender side is gone.
    pub async fn follow(&mut self, mut changes: broadcast::Receiver<MedalCountsChanged>) {
        while self.next_change(&mut changes).await {}
    }
}
