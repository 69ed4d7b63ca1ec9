//! Storage Engine Module
//!
//! This module provides the core storage functionality for EmberKV: the
//! keyspace, the time-ordered expiration index, and the background sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │  ┌───────────────────────────┐   ┌───────────────────────┐   │
//! │  │        Keyspace           │   │     ExpiryIndex       │   │
//! │  │  strings / sets / metas   │   │  (deadline, name)     │   │
//! │  │  + snapshot slot          │   │  ordered by deadline  │   │
//! │  │        RwLock             │   │        RwLock         │   │
//! │  └───────────────────────────┘   └───────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//!                    ▲                        ▲
//!                    │ delete expired         │ collect due
//!              ┌─────┴────────────────────────┴─────┐
//!              │              Sweeper               │
//!              │    (background task, 1 s tick)     │
//!              └────────────────────────────────────┘
//! ```
//!
//! ## Lock Discipline
//!
//! The keyspace lock is acquired before the index lock whenever both are
//! needed. The sweeper never holds the index lock while deleting: it
//! collects the due entries under a read view first.
//!
//! ## Example
//!
//! ```
//! use emberkv::storage::Store;
//! use std::time::Duration;
//!
//! let store = Store::new();
//!
//! store.set("name", "ember").unwrap();
//! store.sadd("tags", &["fast".to_string(), "small".to_string()]).unwrap();
//!
//! store.expire("name", Duration::from_secs(3600)).unwrap();
//! assert_eq!(store.ttl("name").unwrap(), 3600);
//! ```

pub mod engine;
pub mod index;
pub mod sweeper;

// Re-export commonly used types
pub use engine::{KeyKind, KeyMeta, Store, StoreError};
pub use index::ExpiryIndex;
pub use sweeper::{Sweeper, SWEEP_INTERVAL};
