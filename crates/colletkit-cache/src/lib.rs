//! # ColletKit Cache
//!
//! Session inventory cache persisted to local storage with graceful
//! degradation when storage runs out of space.

pub mod cache;
pub mod strategy;

pub use cache::{InventoryCache, RefreshSummary, BITS_CACHE_KEY, COLLETS_CACHE_KEY};
pub use strategy::{save, slim, SaveOutcome, SaveStrategy, LARGE_IMAGE_THRESHOLD};
