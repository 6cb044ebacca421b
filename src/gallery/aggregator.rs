//! Gallery Aggregator
//!
//! Runs one load cycle as two concurrent phases:
//!
//! 1. **Search**: every keyword is queried at once. A failed keyword
//!    contributes no ids; the rest still merge.
//! 2. **Detail**: every merged id is fetched at once. A not-found id is
//!    skipped, any other failure aborts the cycle.
//!
//! Results are reassembled in merged-id order, so output never depends on
//! completion order. At most one cycle runs at a time; overlapping calls are
//! dropped rather than queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use super::merge::{merge_keyword_ids, order_by_ids};
use super::model::{GalleryItem, ObjectId, ObjectRecord};
use super::source::{CollectionSource, GalleryConfig, GalleryError};

/// What a gallery screen should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    /// A cycle is in flight.
    Loading,
    /// The last cycle failed with this message.
    Failed(String),
    /// The last successful cycle's items, possibly empty.
    Items(Vec<GalleryItem>),
}

#[derive(Debug, Default)]
struct GalleryState {
    items: Vec<GalleryItem>,
    is_loading: bool,
    error: Option<String>,
}

/// Clears the loading flag when a cycle ends, including when its future is
/// dropped mid-flight.
struct LoadingGuard<'a> {
    state: &'a Mutex<GalleryState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock_state(self.state).is_loading = false;
    }
}

fn lock_state(state: &Mutex<GalleryState>) -> MutexGuard<'_, GalleryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Aggregates keyword search and detail lookups into a gallery.
pub struct GalleryAggregator {
    source: Arc<dyn CollectionSource>,
    keywords: Vec<String>,
    max_items: usize,
    state: Mutex<GalleryState>,
    cycles: AtomicU64,
}

impl GalleryAggregator {
    /// Create an aggregator over `source`.
    pub fn new(source: Arc<dyn CollectionSource>, config: &GalleryConfig) -> Self {
        Self {
            source,
            keywords: config.keywords.clone(),
            max_items: config.max_items,
            state: Mutex::new(GalleryState::default()),
            cycles: AtomicU64::new(0),
        }
    }

    /// Load unless items are already present.
    pub async fn load_if_needed(&self) {
        self.load(false).await;
    }

    /// Load again, replacing the current items.
    pub async fn reload(&self) {
        self.load(true).await;
    }

    async fn load(&self, force: bool) {
        {
            let mut state = self.lock();
            if state.is_loading {
                debug!("Gallery load already in flight, ignoring");
                return;
            }
            if !force && !state.items.is_empty() {
                return;
            }
            state.is_loading = true;
            state.error = None;
        }
        let _loading = LoadingGuard { state: &self.state };

        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Gallery cycle {} started ({} keywords)", cycle, self.keywords.len());
        let result = self.run_cycle().await;

        let mut state = self.lock();
        match result {
            Ok(items) => {
                info!("Gallery cycle {} loaded {} items", cycle, items.len());
                state.items = items;
            }
            Err(e) => {
                warn!("Gallery cycle {} failed: {}", cycle, e);
                state.items.clear();
                state.error = Some(e.to_string());
            }
        }
    }

    async fn run_cycle(&self) -> Result<Vec<GalleryItem>, GalleryError> {
        let ids = self.search_phase().await;
        let records = self.detail_phase(&ids).await?;
        Ok(records.iter().map(GalleryItem::from_record).collect())
    }

    async fn search_phase(&self) -> Vec<ObjectId> {
        let searches = self.keywords.iter().map(|kw| self.source.search(kw));
        let results = join_all(searches).await;

        let per_keyword: Vec<Vec<ObjectId>> = results
            .into_iter()
            .zip(&self.keywords)
            .map(|(result, keyword)| match result {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("Search for {:?} failed: {}", keyword, e);
                    Vec::new()
                }
            })
            .collect();

        merge_keyword_ids(&per_keyword, self.max_items)
    }

    async fn detail_phase(&self, ids: &[ObjectId]) -> Result<Vec<ObjectRecord>, GalleryError> {
        let fetches = ids.iter().map(|&id| self.source.fetch_object(id));
        let records: Vec<ObjectRecord> = try_join_all(fetches)
            .await?
            .into_iter()
            .flatten()
            .filter(ObjectRecord::has_image)
            .collect();

        Ok(order_by_ids(records, ids))
    }

    fn lock(&self) -> MutexGuard<'_, GalleryState> {
        lock_state(&self.state)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current items.
    pub fn items(&self) -> Vec<GalleryItem> {
        self.lock().items.clone()
    }

    /// Whether a cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    /// Message of the last failed cycle.
    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Render state. Loading wins over a stale error.
    pub fn view(&self) -> GalleryView {
        let state = self.lock();
        if state.is_loading {
            GalleryView::Loading
        } else if let Some(message) = &state.error {
            GalleryView::Failed(message.clone())
        } else {
            GalleryView::Items(state.items.clone())
        }
    }

    /// Number of cycles started so far.
    pub fn network_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }
}
