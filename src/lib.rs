//! # memtext
//!
//! A blocking client for the memcached text protocol with:
//! - Typed request encoding for every text command
//! - A reply classifier mapping reply lines to a closed set of outcomes
//! - Framing of `VALUE` blocks, `STAT` listings and single-line replies
//! - A sticky per-connection error slot for broken streams
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Pool (optional)                          │
//! │               (exclusive connection leases)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Connection                               │
//! │        (one command in flight, sticky error slot)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Codec     │          │ LineStream  │
//!   │ (+ Reply    │          │ (buffered   │
//!   │ classifier) │          │  TCP I/O)   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memtext::TcpConnection;
//!
//! let mut conn = TcpConnection::open("127.0.0.1:11211")?;
//! conn.set("greeting", b"hello", 0, 0, false)?;
//! let item = conn.get("greeting")?;
//! assert_eq!(&item.value[..], b"hello");
//! # Ok::<(), memtext::MemtextError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemtextError, Result};
pub use config::Config;
pub use network::{Connection, Pool, TcpConnection};
pub use protocol::{Item, Reply, Stats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memtext
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
