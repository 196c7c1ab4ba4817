//! Bounded in-memory caches
//!
//! @module cache

mod fifo;
mod store;

pub use fifo::BoundedCache;
pub use store::CacheStore;
