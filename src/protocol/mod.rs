//! Command Protocol
//!
//! This module implements the text command surface of EmberKV.
//!
//! ## Overview
//!
//! A command is a single line of whitespace-separated tokens. The first
//! token is the verb (case-insensitive); the rest are raw string arguments.
//! There is no quoting and no escaping.
//!
//! ## Modules
//!
//! - `command`: The lexer/validator producing a typed [`Command`]
//!
//! ## Example
//!
//! ```
//! use emberkv::protocol::{parse, Verb};
//!
//! let cmd = parse("SADD colors red green").unwrap();
//! assert_eq!(cmd.verb, Verb::SAdd);
//! assert_eq!(cmd.keys, vec!["colors".to_string()]);
//! ```

pub mod command;

// Re-export commonly used types for convenience
pub use command::{parse, parse_seconds, Command, ParseError, ParseResult, Verb};
