//! # EmberKV - An In-Memory Key-Value Store with Sets and Snapshots
//!
//! EmberKV is a small in-memory key-value store modeled after a subset of
//! the Redis command set. It holds two value shapes (scalar strings and
//! unordered sets of strings), supports per-key expiration with both lazy
//! and active reclamation, and keeps a single in-process snapshot that can
//! be saved and restored on demand.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                             EmberKV                                │
//! │                                                                    │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────────┐       │
//! │  │ HTTP server │───>│    Lexer/    │───>│ CommandHandler   │       │
//! │  │ POST /execute│   │  Validator   │    │  (dispatcher)    │       │
//! │  └─────────────┘    └──────────────┘    └────────┬─────────┘       │
//! │                                                  │                 │
//! │                                                  ▼                 │
//! │                     ┌────────────────────────────────────────────┐ │
//! │                     │                  Store                     │ │
//! │                     │  ┌──────────────────┐  ┌────────────────┐  │ │
//! │                     │  │ Keyspace (RwLock)│  │  ExpiryIndex   │  │ │
//! │                     │  │ strings/sets/    │  │  (RwLock)      │  │ │
//! │                     │  │ metas + snapshot │  │  by deadline   │  │ │
//! │                     │  └──────────────────┘  └────────────────┘  │ │
//! │                     └────────────────────────────────────────────┘ │
//! │                                                  ▲                 │
//! │                                                  │                 │
//! │                     ┌────────────────────────────┴───────────────┐ │
//! │                     │                 Sweeper                    │ │
//! │                     │        (background task, 1 s tick)         │ │
//! │                     └────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use emberkv::commands::CommandHandler;
//! use emberkv::storage::Store;
//!
//! let store = Store::new();
//! let handler = CommandHandler::new(store);
//!
//! assert_eq!(handler.handle("SET name ember").unwrap(), None);
//! assert_eq!(handler.handle("SADD tags fast small").unwrap(), None);
//!
//! assert_eq!(
//!     handler.handle("GET name").unwrap(),
//!     Some(vec!["ember".to_string()])
//! );
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value` / `GET key`
//! - `SADD key v1 [v2 ...]` / `SREM key v1 [v2 ...]`
//! - `SMEMBERS key` / `SINTER key1 [key2 ...]`
//! - `KEYS` / `DEL key`
//! - `EXPIRE key seconds` / `TTL key`
//! - `SAVE` / `RESTORE`
//!
//! ## Expiration
//!
//! Keys with a nonzero ttl are expired two ways:
//! 1. **Lazy**: a command that names an expired key deletes it first and
//!    then sees it as absent.
//! 2. **Active**: a background sweeper wakes every second and deletes
//!    every key whose deadline has passed, guided by a time-ordered index.
//!
//! A key's deadline is `last_renewed + ttl`; only SET and EXPIRE renew.
//!
//! ## Module Overview
//!
//! - [`protocol`]: command lexer/validator
//! - [`storage`]: keyspace, expiration index, sweeper, snapshots
//! - [`commands`]: command dispatcher
//! - [`server`]: JSON-over-HTTP transport

pub mod commands;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandError, CommandHandler};
pub use protocol::{parse, Command, ParseError, Verb};
pub use storage::{Store, StoreError, SWEEP_INTERVAL};

/// The default port EmberKV listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host EmberKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
