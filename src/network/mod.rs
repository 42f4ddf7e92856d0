//! Network Module
//!
//! Client connections to a memcached server.
//!
//! ## Architecture
//! - `LineStream` frames bytes into lines and fixed-size blocks
//! - `Connection` runs one command at a time over a `LineStream`
//! - `Pool` hands out exclusive connection leases

mod stream;
mod connection;
mod pool;

pub use stream::LineStream;
pub use connection::{Connection, TcpConnection};
pub use pool::Pool;
