//! Command definitions
//!
//! Represents requests sent to the server.

use crate::error::{MemtextError, Result};

/// Longest key memcached accepts
pub const MAX_KEY_LEN: usize = 250;

/// Storage command flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Store unconditionally
    Set,

    /// Store only if the key is absent
    Add,

    /// Store only if the key is present
    Replace,

    /// Add data after the existing value
    Append,

    /// Add data before the existing value
    Prepend,

    /// Store only if the item's CAS token still matches
    Cas(u64),
}

impl StorageMode {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            StorageMode::Set => "set",
            StorageMode::Add => "add",
            StorageMode::Replace => "replace",
            StorageMode::Append => "append",
            StorageMode::Prepend => "prepend",
            StorageMode::Cas(_) => "cas",
        }
    }
}

/// Counter direction for `incr` / `decr`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    Incr,
    Decr,
}

impl CounterOp {
    pub fn name(&self) -> &'static str {
        match self {
            CounterOp::Incr => "incr",
            CounterOp::Decr => "decr",
        }
    }
}

/// A request, borrowing its key(s) and payload from the caller
#[derive(Debug, Clone)]
pub enum Command<'a> {
    /// Fetch a single item
    Get { key: &'a str },

    /// Fetch several items together with their CAS tokens
    Gets { keys: Vec<&'a str> },

    /// Any of the storage commands, including `cas`
    Store {
        mode: StorageMode,
        key: &'a str,
        value: &'a [u8],
        flags: u32,
        exptime: i64,
        noreply: bool,
    },

    /// Remove an item
    Delete { key: &'a str, noreply: bool },

    /// Increment or decrement a numeric item
    Counter {
        op: CounterOp,
        key: &'a str,
        amount: u64,
        noreply: bool,
    },

    /// Update an item's expiration time
    Touch {
        key: &'a str,
        exptime: i64,
        noreply: bool,
    },

    /// Server statistics, optionally for a sub-group
    Stats { arg: Option<&'a str> },

    /// Invalidate all items, optionally after a delay in seconds
    FlushAll { delay: Option<u32>, noreply: bool },

    /// Server version
    Version,

    /// Ask the server to close the connection
    Quit,
}

impl<'a> Command<'a> {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Gets { .. } => "gets",
            Command::Store { mode, .. } => mode.name(),
            Command::Delete { .. } => "delete",
            Command::Counter { op, .. } => op.name(),
            Command::Touch { .. } => "touch",
            Command::Stats { .. } => "stats",
            Command::FlushAll { .. } => "flush_all",
            Command::Version => "version",
            Command::Quit => "quit",
        }
    }

    /// Whether the server will send anything back
    pub fn expects_reply(&self) -> bool {
        match self {
            Command::Store { noreply, .. }
            | Command::Delete { noreply, .. }
            | Command::Counter { noreply, .. }
            | Command::Touch { noreply, .. }
            | Command::FlushAll { noreply, .. } => !noreply,
            Command::Quit => false,
            _ => true,
        }
    }

    /// Keys carried by this command
    pub fn keys(&self) -> Vec<&'a str> {
        match self {
            Command::Get { key }
            | Command::Store { key, .. }
            | Command::Delete { key, .. }
            | Command::Counter { key, .. }
            | Command::Touch { key, .. } => vec![*key],
            Command::Gets { keys } => keys.clone(),
            _ => Vec::new(),
        }
    }

    /// Reject requests the server could only answer with `CLIENT_ERROR`,
    /// or that would desynchronize the line framing.
    pub fn validate(&self) -> Result<()> {
        if let Command::Gets { keys } = self {
            if keys.is_empty() {
                return Err(MemtextError::MalformedKey(
                    "gets requires at least one key".to_string(),
                ));
            }
        }
        if let Command::Stats { arg: Some(arg) } = self {
            if arg.bytes().any(|b| b == b'\r' || b == b'\n') {
                return Err(MemtextError::MalformedKey(format!(
                    "stats argument contains a line break: {:?}",
                    arg
                )));
            }
        }
        for key in self.keys() {
            validate_key(key)?;
        }
        Ok(())
    }
}

/// Check a key against the text protocol's rules
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MemtextError::MalformedKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(MemtextError::MalformedKey(format!(
            "key is {} bytes long (max {})",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    if key.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(MemtextError::MalformedKey(format!(
            "key contains whitespace or control characters: {:?}",
            key
        )));
    }
    Ok(())
}
