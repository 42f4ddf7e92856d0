//! Reply classification
//!
//! Maps one reply line (CRLF already stripped) to a closed set of outcomes
//! without doing any further I/O. Each command decides what to do with the
//! outcomes that are not meaningful to it; counters, for example, parse an
//! `Unrecognized` line as the new value.

use crate::error::{MemtextError, Result};

pub const REPLY_STORED: &[u8] = b"STORED";
pub const REPLY_DELETED: &[u8] = b"DELETED";
pub const REPLY_TOUCHED: &[u8] = b"TOUCHED";
pub const REPLY_OK: &[u8] = b"OK";
pub const REPLY_EXISTS: &[u8] = b"EXISTS";
pub const REPLY_NOT_STORED: &[u8] = b"NOT_STORED";
pub const REPLY_NOT_FOUND: &[u8] = b"NOT_FOUND";
pub const REPLY_ERROR: &[u8] = b"ERROR";
pub const REPLY_CLIENT_ERROR_PREFIX: &[u8] = b"CLIENT_ERROR ";
pub const REPLY_SERVER_ERROR_PREFIX: &[u8] = b"SERVER_ERROR ";

/// Fixed success tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessToken {
    Stored,
    Deleted,
    Touched,
    Ok,
}

/// Outcome of classifying a reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    Success(SuccessToken),
    CasConflict,
    NotStored,
    NotFound,
    GenericError,
    ClientError(&'a [u8]),
    ServerError(&'a [u8]),
    Unrecognized(&'a [u8]),
}

impl<'a> Reply<'a> {
    /// Classify a reply line.
    ///
    /// Exact tokens are checked first, then the two error prefixes. Anything
    /// else, bare numbers included, is `Unrecognized`.
    pub fn classify(line: &'a [u8]) -> Self {
        match line {
            REPLY_STORED => Reply::Success(SuccessToken::Stored),
            REPLY_DELETED => Reply::Success(SuccessToken::Deleted),
            REPLY_TOUCHED => Reply::Success(SuccessToken::Touched),
            REPLY_OK => Reply::Success(SuccessToken::Ok),
            REPLY_EXISTS => Reply::CasConflict,
            REPLY_NOT_STORED => Reply::NotStored,
            REPLY_NOT_FOUND => Reply::NotFound,
            REPLY_ERROR => Reply::GenericError,
            _ => {
                if let Some(msg) = line.strip_prefix(REPLY_CLIENT_ERROR_PREFIX) {
                    Reply::ClientError(msg)
                } else if let Some(msg) = line.strip_prefix(REPLY_SERVER_ERROR_PREFIX) {
                    Reply::ServerError(msg)
                } else {
                    Reply::Unrecognized(line)
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    /// The error a known error reply stands for.
    ///
    /// `None` for successes and for unrecognized lines.
    pub fn error(&self) -> Option<MemtextError> {
        match self {
            Reply::Success(_) | Reply::Unrecognized(_) => None,
            Reply::CasConflict => Some(MemtextError::CasConflict),
            Reply::NotStored => Some(MemtextError::NotStored),
            Reply::NotFound => Some(MemtextError::NotFound),
            Reply::GenericError => Some(MemtextError::ReplyError),
            Reply::ClientError(msg) => Some(MemtextError::ClientError(lossy(msg))),
            Reply::ServerError(msg) => Some(MemtextError::ServerError(lossy(msg))),
        }
    }

    /// Collapse into a status for commands whose only valid answer is a
    /// success token. Unrecognized lines become a protocol error.
    pub fn into_status(self) -> Result<()> {
        match self {
            Reply::Success(_) => Ok(()),
            Reply::Unrecognized(line) => Err(unknown_reply(line)),
            other => Err(other
                .error()
                .unwrap_or_else(|| MemtextError::protocol("unclassified reply"))),
        }
    }
}

/// Free-function form of [`Reply::classify`]
pub fn classify(line: &[u8]) -> Reply<'_> {
    Reply::classify(line)
}

pub(crate) fn unknown_reply(line: &[u8]) -> MemtextError {
    MemtextError::Protocol(format!("unknown reply type: {}", lossy(line)))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
