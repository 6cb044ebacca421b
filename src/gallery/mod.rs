//! Gallery Layer
//!
//! Fetches themed artwork records from a public collection API and
//! merges them into a deterministic, display-ready list.

pub mod aggregator;
pub mod merge;
pub mod model;
pub mod source;

pub use aggregator::{GalleryAggregator, GalleryView};
pub use merge::{merge_keyword_ids, order_by_ids};
pub use model::{GalleryItem, ObjectId, ObjectRecord, SearchResponse};
pub use source::{CollectionSource, GalleryConfig, GalleryError, HttpCollection};
