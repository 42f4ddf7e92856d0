//! Error types for memtext
//!
//! Provides a unified error type for all operations.
//!
//! Errors fall into a few groups:
//! - transport and framing errors come from the stream layer and are passed through
//! - protocol errors mean the server's reply did not have the expected shape
//! - domain errors (cache miss, not found, not stored, CAS conflict) are normal outcomes
//! - server-reported errors carry the message text the server sent back

use std::num::ParseIntError;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias using MemtextError
pub type Result<T> = std::result::Result<T, MemtextError>;

/// Unified error type for memtext operations
///
/// The type is `Clone` so that a connection can keep the first fatal error
/// in its sticky slot while handing the same error back to the caller.
#[derive(Debug, Clone, Error)]
pub enum MemtextError {
    // -------------------------------------------------------------------------
    // Transport / Framing Errors
    // -------------------------------------------------------------------------
    #[error("memcache: io error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("memcache: buffer is not enough: reply line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("memcache: protocol error: {0}")]
    Protocol(String),

    #[error("memcache: invalid number: {0}")]
    InvalidNumber(#[from] ParseIntError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("memcache: cache miss")]
    CacheMiss,

    #[error("memcache: item not found")]
    NotFound,

    #[error("memcache: item not stored")]
    NotStored,

    #[error("memcache: compare-and-swap conflict")]
    CasConflict,

    // -------------------------------------------------------------------------
    // Server-Reported Errors
    // -------------------------------------------------------------------------
    #[error("memcache: nonexistent command name")]
    ReplyError,

    #[error("memcache: client error: {0}")]
    ClientError(String),

    #[error("memcache: server error: {0}")]
    ServerError(String),

    // -------------------------------------------------------------------------
    // Request Errors (raised locally, nothing is sent)
    // -------------------------------------------------------------------------
    #[error("memcache: malformed key: {0}")]
    MalformedKey(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("memcache: configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for MemtextError {
    fn from(err: std::io::Error) -> Self {
        MemtextError::Io(Arc::new(err))
    }
}

impl MemtextError {
    /// Build a protocol error from anything printable
    pub fn protocol(msg: impl Into<String>) -> Self {
        MemtextError::Protocol(msg.into())
    }

    /// True for the expected, named outcomes of a well-formed exchange
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            MemtextError::CacheMiss
                | MemtextError::NotFound
                | MemtextError::NotStored
                | MemtextError::CasConflict
        )
    }

    /// True when the server answered with `ERROR`, `CLIENT_ERROR` or `SERVER_ERROR`
    pub fn is_server_reported(&self) -> bool {
        matches!(
            self,
            MemtextError::ReplyError | MemtextError::ClientError(_) | MemtextError::ServerError(_)
        )
    }

    /// True when the stream position is no longer known after this error.
    ///
    /// A connection that returned a fatal error should be closed, not reused.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MemtextError::Io(_)
                | MemtextError::LineTooLong { .. }
                | MemtextError::Protocol(_)
                | MemtextError::InvalidNumber(_)
        )
    }

    /// The `io::ErrorKind` of a transport error, if this is one
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            MemtextError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}
