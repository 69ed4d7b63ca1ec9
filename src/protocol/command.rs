//! Command Lexer and Validator
//!
//! This module turns a raw command line into a validated [`Command`].
//! It is a pure function of its input: no storage access, no side effects.
//!
//! ## How Parsing Works
//!
//! 1. Trim leading/trailing whitespace from the line
//! 2. Split on single spaces (no quoting, no escapes)
//! 3. Uppercase the first token and resolve it to a [`Verb`]
//! 4. Check the verb's arity and collect the key names it addresses
//!
//! The returned [`Command`] carries the original tokens plus the key list,
//! so the dispatcher can prune expired keys before executing the verb body.
//!
//! Note that splitting is on *single* spaces: a run of two spaces produces
//! an empty token, which then fails arity validation. Clients send exactly
//! one space between tokens.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while lexing and validating a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input line was empty (or whitespace only)
    #[error("empty command")]
    Empty,

    /// The first token is not a known verb
    #[error("unknown command")]
    UnknownVerb,

    /// The token count does not match the verb's arity
    #[error("{0}")]
    Usage(&'static str),

    /// EXPIRE's seconds argument is not a non-negative integer
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The twelve verbs of the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Set,
    Get,
    SAdd,
    SRem,
    SMembers,
    SInter,
    Keys,
    Del,
    Expire,
    Ttl,
    Save,
    Restore,
}

impl Verb {
    /// Resolves an uppercased token to a verb.
    fn resolve(token: &str) -> Option<Verb> {
        match token {
            "SET" => Some(Verb::Set),
            "GET" => Some(Verb::Get),
            "SADD" => Some(Verb::SAdd),
            "SREM" => Some(Verb::SRem),
            "SMEMBERS" => Some(Verb::SMembers),
            "SINTER" => Some(Verb::SInter),
            "KEYS" => Some(Verb::Keys),
            "DEL" => Some(Verb::Del),
            "EXPIRE" => Some(Verb::Expire),
            "TTL" => Some(Verb::Ttl),
            "SAVE" => Some(Verb::Save),
            "RESTORE" => Some(Verb::Restore),
            _ => None,
        }
    }

    /// The usage message reported on an arity violation.
    fn usage(self) -> &'static str {
        match self {
            Verb::Set => "SET command format is: SET key value",
            Verb::Get => "GET command format is: GET key",
            Verb::SAdd => "SADD command format is: SADD key value1 [value2...]",
            Verb::SRem => "SREM command format is: SREM key value1 [value2...]",
            Verb::SMembers => "SMEMBERS command format is: SMEMBERS key",
            Verb::SInter => "SINTER command format is: SINTER key1 [key2] ...",
            Verb::Keys => "KEYS command format is: KEYS",
            Verb::Del => "DEL command format is: DEL key",
            Verb::Expire => "EXPIRE command format is: EXPIRE key seconds",
            Verb::Ttl => "TTL command format is: TTL key",
            Verb::Save => "SAVE command format is: SAVE",
            Verb::Restore => "RESTORE command format is: RESTORE",
        }
    }

    /// Checks the token count (verb included) against this verb's arity.
    fn arity_ok(self, len: usize) -> bool {
        match self {
            Verb::Set | Verb::Expire => len == 3,
            Verb::Get | Verb::SMembers | Verb::Del | Verb::Ttl => len == 2,
            Verb::SAdd | Verb::SRem => len >= 3,
            Verb::SInter => len >= 2,
            Verb::Keys | Verb::Save | Verb::Restore => len == 1,
        }
    }
}

/// A validated command: the verb, its raw tokens, and the key names it
/// addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The resolved verb
    pub verb: Verb,
    /// All tokens, verb included, in arrival order
    pub args: Vec<String>,
    /// The key names the verb addresses (empty for KEYS/SAVE/RESTORE)
    pub keys: Vec<String>,
}

/// Lexes and validates one command line.
///
/// # Example
///
/// ```
/// use emberkv::protocol::{parse, Verb};
///
/// let cmd = parse("set name ember").unwrap();
/// assert_eq!(cmd.verb, Verb::Set);
/// assert_eq!(cmd.keys, vec!["name".to_string()]);
/// ```
pub fn parse(line: &str) -> ParseResult<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut args: Vec<String> = line.split(' ').map(str::to_string).collect();

    args[0] = args[0].to_uppercase();
    let verb = Verb::resolve(&args[0]).ok_or(ParseError::UnknownVerb)?;

    if !verb.arity_ok(args.len()) {
        return Err(ParseError::Usage(verb.usage()));
    }

    let keys = match verb {
        Verb::Set
        | Verb::Get
        | Verb::SAdd
        | Verb::SRem
        | Verb::SMembers
        | Verb::Del
        | Verb::Expire
        | Verb::Ttl => vec![args[1].clone()],
        Verb::SInter => args[1..].to_vec(),
        Verb::Keys | Verb::Save | Verb::Restore => Vec::new(),
    };

    Ok(Command { verb, args, keys })
}

/// Parses EXPIRE's seconds argument: a non-negative decimal integer of
/// whole seconds. `0` clears the expiry.
pub fn parse_seconds(token: &str) -> ParseResult<Duration> {
    let secs: u64 = token
        .parse()
        .map_err(|_| ParseError::InvalidDuration(token.to_string()))?;
    Ok(Duration::from_secs(secs))
}
