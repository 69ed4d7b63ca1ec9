//! Command Dispatcher
//!
//! Binds a validated command line to the store: parse, prune every key the
//! command addresses, then execute the verb body.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────┐     │
//! │  │   parse()   │───>│ prune keys   │───>│  execute    │     │
//! │  └─────────────┘    └──────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                             Store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The on-access prune runs before the verb body, so a command never
//! observes a key whose deadline has already passed: the key is deleted
//! and the command sees it as absent.
//!
//! A successful command yields either `Some(values)` (GET, SMEMBERS,
//! SINTER, KEYS, TTL) or `None` for the verbs with nothing to report
//! (SET, SADD, SREM, DEL, EXPIRE, SAVE, RESTORE); the transport renders
//! `None` as `["OK"]`.

use crate::protocol::{self, ParseError, Verb};
use crate::storage::{Store, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Any error a command can produce, parse-level or store-level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes command lines against a shared store.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    store: Arc<Store>,
}

impl CommandHandler {
    /// Creates a handler over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The store this handler dispatches to.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Executes one command line.
    ///
    /// # Example
    ///
    /// ```
    /// use emberkv::commands::CommandHandler;
    /// use emberkv::storage::Store;
    ///
    /// let handler = CommandHandler::new(Store::new());
    /// assert_eq!(handler.handle("SET greeting hello").unwrap(), None);
    /// assert_eq!(
    ///     handler.handle("GET greeting").unwrap(),
    ///     Some(vec!["hello".to_string()])
    /// );
    /// ```
    pub fn handle(&self, line: &str) -> Result<Option<Vec<String>>, CommandError> {
        let cmd = protocol::parse(line)?;
        debug!(verb = ?cmd.verb, keys = ?cmd.keys, "dispatching command");

        if !cmd.keys.is_empty() {
            self.store.prune_expired(&cmd.keys);
        }

        match cmd.verb {
            Verb::Set => {
                self.store.set(&cmd.args[1], &cmd.args[2])?;
                Ok(None)
            }
            Verb::Get => Ok(Some(vec![self.store.get(&cmd.args[1])?])),
            Verb::SAdd => {
                self.store.sadd(&cmd.args[1], &cmd.args[2..])?;
                Ok(None)
            }
            Verb::SRem => {
                self.store.srem(&cmd.args[1], &cmd.args[2..])?;
                Ok(None)
            }
            Verb::SMembers => Ok(Some(self.store.smembers(&cmd.args[1])?)),
            Verb::SInter => Ok(Some(self.store.sinter(&cmd.keys)?)),
            Verb::Keys => Ok(Some(self.store.keys())),
            Verb::Del => {
                self.store.del(&cmd.args[1])?;
                Ok(None)
            }
            Verb::Expire => {
                let ttl = protocol::parse_seconds(&cmd.args[2])?;
                self.store.expire(&cmd.args[1], ttl)?;
                Ok(None)
            }
            Verb::Ttl => Ok(Some(vec![self.store.ttl(&cmd.args[1])?.to_string()])),
            Verb::Save => {
                self.store.save()?;
                Ok(None)
            }
            Verb::Restore => {
                self.store.restore()?;
                Ok(None)
            }
        }
    }
}
