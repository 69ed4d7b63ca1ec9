//! Command Handling Module
//!
//! This module implements the command dispatcher for EmberKV: it binds a
//! validated command line to keyspace operations and shapes the result for
//! the transport.
//!
//! ## Supported Commands
//!
//! ### Scalar Commands
//! - `SET key value` - Set a key to a string value
//! - `GET key` - Get a key's string value
//!
//! ### Set Commands
//! - `SADD key value [value ...]` - Add members to a set
//! - `SREM key value [value ...]` - Remove members from a set
//! - `SMEMBERS key` - List a set's members
//! - `SINTER key [key ...]` - Intersect one or more sets
//!
//! ### Key Commands
//! - `KEYS` - List all live keys
//! - `DEL key` - Delete a key
//! - `EXPIRE key seconds` - Set a key's time-to-live (0 clears it)
//! - `TTL key` - Remaining seconds before expiry
//!
//! ### Snapshot Commands
//! - `SAVE` - Deep-copy the keyspace into the snapshot slot
//! - `RESTORE` - Replace the keyspace with the snapshot (consumes it)

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandError, CommandHandler};
