//! Protocol Module
//!
//! Defines the memcached text protocol as seen from the client side.
//!
//! ## Framing
//! Every request and every reply line is ASCII text terminated by CRLF.
//! Values travel as length-prefixed data blocks, so they may contain any
//! byte; the two bytes after the block must be CRLF.
//!
//! ### Reply Tokens
//! - `STORED` / `DELETED` / `TOUCHED` / `OK`: success
//! - `EXISTS`: CAS conflict
//! - `NOT_STORED`: add/replace condition not met
//! - `NOT_FOUND`: no such item
//! - `ERROR`: unknown command name
//! - `CLIENT_ERROR <msg>` / `SERVER_ERROR <msg>`: server-reported failures
//!
//! ### Multi-line Replies
//! ```text
//! VALUE <key> <flags> <bytes> [<cas>]\r\n
//! <data block>\r\n
//! ...
//! END\r\n
//!
//! STAT <name> <value>\r\n
//! ...
//! END\r\n
//! ```

mod command;
mod response;
mod reply;
mod codec;

pub use command::{validate_key, Command, CounterOp, StorageMode, MAX_KEY_LEN};
pub use response::{Item, Stats, ValueHeader};
pub use reply::{classify, Reply, SuccessToken};
pub use codec::{
    check_data_block, encode_command, is_end, parse_counter_reply, parse_stat_line,
    parse_value_header, parse_version_reply,
};
