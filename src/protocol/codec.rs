//! Protocol codec
//!
//! Encoding of request lines and parsing of the structured reply lines.
//!
//! ## Request Lines
//! ```text
//! get <key>\r\n
//! gets <key>*\r\n
//! <set|add|replace|append|prepend> <key> <flags> <exptime> <bytes> [noreply]\r\n<data>\r\n
//! cas <key> <flags> <exptime> <bytes> <cas unique> [noreply]\r\n<data>\r\n
//! delete <key> [noreply]\r\n
//! <incr|decr> <key> <amount> [noreply]\r\n
//! touch <key> <exptime> [noreply]\r\n
//! stats [<arg>]\r\n
//! flush_all [<delay>] [noreply]\r\n
//! version\r\n
//! quit\r\n
//! ```
//!
//! ## Structured Reply Lines
//! ```text
//! VALUE <key> <flags> <bytes> [<cas unique>]\r\n<data>\r\n
//! STAT <name> <value>\r\n
//! VERSION <version>\r\n
//! END\r\n
//! ```

use crate::error::{MemtextError, Result};
use super::command::{Command, StorageMode};
use super::reply::Reply;
use super::response::ValueHeader;

pub const CRLF: &[u8] = b"\r\n";
pub const RESPONSE_END: &[u8] = b"END";
pub const VALUE_PREFIX: &str = "VALUE";
pub const STAT_PREFIX: &[u8] = b"STAT ";
pub const VERSION_PREFIX: &[u8] = b"VERSION ";
pub const OPTION_NOREPLY: &str = "noreply";

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a command to bytes: the request line and, for storage commands,
/// the data block followed by CRLF.
///
/// The byte count on the line is always taken from the payload itself.
pub fn encode_command(command: &Command<'_>) -> Vec<u8> {
    let mut line = LineBuilder::new(command.name());

    match command {
        Command::Get { key } => {
            line.token(key);
        }
        Command::Gets { keys } => {
            for key in keys {
                line.token(key);
            }
        }
        Command::Store {
            mode,
            key,
            value,
            flags,
            exptime,
            noreply,
        } => {
            line.token(key)
                .number(*flags)
                .number(*exptime)
                .number(value.len());
            if let StorageMode::Cas(unique) = mode {
                line.number(*unique);
            }
            line.noreply(*noreply);
            return line.finish_with_block(value);
        }
        Command::Delete { key, noreply } => {
            line.token(key).noreply(*noreply);
        }
        Command::Counter {
            key,
            amount,
            noreply,
            ..
        } => {
            line.token(key).number(*amount).noreply(*noreply);
        }
        Command::Touch {
            key,
            exptime,
            noreply,
        } => {
            line.token(key).number(*exptime).noreply(*noreply);
        }
        Command::Stats { arg } => {
            if let Some(arg) = arg.filter(|a| !a.is_empty()) {
                line.token(arg);
            }
        }
        Command::FlushAll { delay, noreply } => {
            if let Some(delay) = delay {
                line.number(*delay);
            }
            line.noreply(*noreply);
        }
        Command::Version | Command::Quit => {}
    }

    line.finish()
}

/// Space-separated request line under construction
struct LineBuilder {
    buf: Vec<u8>,
}

impl LineBuilder {
    fn new(name: &str) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(name.as_bytes());
        Self { buf }
    }

    fn token(&mut self, token: &str) -> &mut Self {
        self.buf.push(b' ');
        self.buf.extend_from_slice(token.as_bytes());
        self
    }

    fn number(&mut self, n: impl ToString) -> &mut Self {
        self.token(&n.to_string())
    }

    fn noreply(&mut self, noreply: bool) -> &mut Self {
        if noreply {
            self.token(OPTION_NOREPLY);
        }
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(CRLF);
        self.buf
    }

    fn finish_with_block(mut self, block: &[u8]) -> Vec<u8> {
        self.buf.reserve(block.len() + 2 * CRLF.len());
        self.buf.extend_from_slice(CRLF);
        self.buf.extend_from_slice(block);
        self.buf.extend_from_slice(CRLF);
        self.buf
    }
}

// =============================================================================
// Reply Parsing
// =============================================================================

/// True if the line is the `END` sentinel
pub fn is_end(line: &[u8]) -> bool {
    line == RESPONSE_END
}

/// Parse a `VALUE <key> <flags> <bytes> [<cas unique>]` header.
///
/// Fewer than four fields, or a first field other than `VALUE`, is a
/// protocol error, as is a length too large to read. Non-numeric flags,
/// length or CAS fields are `InvalidNumber` errors.
pub fn parse_value_header(line: &[u8]) -> Result<ValueHeader> {
    let text = std::str::from_utf8(line).map_err(|_| malformed(line))?;
    let fields: Vec<&str> = text.split_ascii_whitespace().collect();
    if fields.len() < 4 || fields[0] != VALUE_PREFIX {
        return Err(malformed(line));
    }

    let key = fields[1].to_string();
    let flags = fields[2].parse::<u32>()?;
    let len = fields[3].parse::<u64>()?;
    let cas = match fields.get(4) {
        Some(field) => Some(field.parse::<u64>()?),
        None => None,
    };

    // The data block is followed by CRLF, so `len + 2` must fit in a usize
    let len = usize::try_from(len)
        .ok()
        .filter(|n| n.checked_add(CRLF.len()).is_some())
        .ok_or_else(|| {
            MemtextError::Protocol(format!("malformed response: value length {} too large", len))
        })?;

    Ok(ValueHeader {
        key,
        flags,
        len,
        cas,
    })
}

/// Check that a data block of `len + 2` bytes ends in CRLF
pub fn check_data_block(block: &[u8]) -> Result<()> {
    if block.ends_with(CRLF) {
        Ok(())
    } else {
        Err(MemtextError::protocol("malformed response: corrupt get result end"))
    }
}

/// Parse a `STAT <name> <value>` line.
///
/// The name ends at the first space after the prefix; the value is the rest
/// of the line and may itself contain spaces.
pub fn parse_stat_line(line: &[u8]) -> Result<(String, String)> {
    let rest = line
        .strip_prefix(STAT_PREFIX)
        .ok_or_else(malformed_stats)?;
    let split = rest.iter().position(|b| *b == b' ').ok_or_else(malformed_stats)?;
    let (name, value) = (&rest[..split], &rest[split + 1..]);
    if name.is_empty() {
        return Err(malformed_stats());
    }

    Ok((
        String::from_utf8_lossy(name).into_owned(),
        String::from_utf8_lossy(value).into_owned(),
    ))
}

/// Parse the reply to `incr` / `decr`.
///
/// Known error replies map to their errors; anything else must be an
/// unsigned decimal.
pub fn parse_counter_reply(line: &[u8]) -> Result<u64> {
    if let Some(err) = Reply::classify(line).error() {
        return Err(err);
    }
    // Some servers pad the new value with trailing spaces.
    let value = String::from_utf8_lossy(line).trim_end().parse::<u64>()?;
    Ok(value)
}

/// Parse the reply to `version`
pub fn parse_version_reply(line: &[u8]) -> Result<String> {
    let reply = Reply::classify(line);
    if let Some(err) = reply.error() {
        return Err(err);
    }
    match line.strip_prefix(VERSION_PREFIX) {
        Some(version) => Ok(String::from_utf8_lossy(version).into_owned()),
        None => Err(super::reply::unknown_reply(line)),
    }
}

fn malformed(line: &[u8]) -> MemtextError {
    MemtextError::Protocol(format!(
        "malformed response: {:?}",
        String::from_utf8_lossy(line)
    ))
}

fn malformed_stats() -> MemtextError {
    MemtextError::protocol("malformed stats response")
}
