//! Core primitives.
//!
//! Deterministic randomness for deck dealing, plus the key-value persistence
//! substrate shared by every durable counter in the game.

pub mod rng;
pub mod store;
pub mod codec;

// Re-export core types
pub use rng::DeterministicRng;
pub use store::{KeyValueStore, MemoryStore, FileStore, SharedStore, StoreError};
pub use codec::CodecError;
