//! Connection Pool
//!
//! Keeps a bounded set of idle connections. A connection taken from the
//! pool is an exclusive lease: only its holder sends commands on it, which
//! keeps one command in flight per connection.

use std::io::{Read, Write};
use std::net::TcpStream;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

use crate::config::Config;
use crate::error::Result;
use super::connection::Connection;

type Dialer<R, W> = Box<dyn Fn() -> Result<Connection<R, W>> + Send + Sync>;

/// Pool of idle connections
pub struct Pool<R = TcpStream, W: Write = TcpStream> {
    /// Opens a new connection when no idle one is available
    dial: Dialer<R, W>,

    /// Idle queue (bounded by max idle connections)
    idle_tx: Sender<Connection<R, W>>,
    idle_rx: Receiver<Connection<R, W>>,
}

impl Pool<TcpStream, TcpStream> {
    /// Pool of TCP connections to the server named in `config`
    pub fn tcp(config: Config) -> Result<Self> {
        config.validate()?;
        let max_idle = config.max_idle_conns;
        Ok(Self::new(move || Connection::connect(&config), max_idle))
    }
}

impl<R: Read, W: Write> Pool<R, W> {
    /// Create a pool from a dial function and an idle capacity
    pub fn new<F>(dial: F, max_idle: usize) -> Self
    where
        F: Fn() -> Result<Connection<R, W>> + Send + Sync + 'static,
    {
        let (idle_tx, idle_rx) = bounded(max_idle);
        Self {
            dial: Box::new(dial),
            idle_tx,
            idle_rx,
        }
    }

    /// Take an idle connection, or dial a new one
    pub fn get(&self) -> Result<Connection<R, W>> {
        if let Ok(conn) = self.idle_rx.try_recv() {
            tracing::trace!("Reusing idle connection to {}", conn.peer_addr());
            return Ok(conn);
        }
        (self.dial)()
    }

    /// Return a connection to the pool.
    ///
    /// Broken connections and connections that do not fit are dropped.
    /// Returns true if the connection was kept.
    pub fn put(&self, conn: Connection<R, W>) -> bool {
        if let Some(err) = conn.error() {
            tracing::debug!("Dropping broken connection to {}: {}", conn.peer_addr(), err);
            return false;
        }

        match self.idle_tx.try_send(conn) {
            Ok(()) => true,
            Err(TrySendError::Full(conn)) | Err(TrySendError::Disconnected(conn)) => {
                tracing::trace!("Idle queue full, dropping connection to {}", conn.peer_addr());
                false
            }
        }
    }

    /// Number of idle connections currently held
    pub fn idle_count(&self) -> usize {
        self.idle_rx.len()
    }
}
