//! Client Connection
//!
//! Drives one memcached connection: sends a command, then reads exactly the
//! reply that command produces.
//!
//! ## Sticky Error
//! The first fatal error (transport, framing, protocol, bad number) is kept
//! on the connection. Until the caller drains it with [`Connection::take_error`],
//! every operation returns that error without touching the stream. Domain
//! errors (miss, not found, not stored, CAS conflict) and server-reported
//! errors come from complete exchanges and are never sticky.
//!
//! One command is in flight at a time; the stream position is the only
//! synchronization there is.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{MemtextError, Result};
use crate::protocol::{
    check_data_block, encode_command, is_end, parse_counter_reply, parse_stat_line,
    parse_value_header, parse_version_reply, Command, CounterOp, Item, Reply, Stats,
    StorageMode,
};
use super::stream::LineStream;

/// Connection over a TCP socket
pub type TcpConnection = Connection<TcpStream, TcpStream>;

/// A memcached text-protocol connection
pub struct Connection<R = TcpStream, W: Write = TcpStream> {
    /// Buffered stream halves
    stream: LineStream<R, W>,

    /// First fatal error, kept until drained
    err: Option<MemtextError>,

    /// Peer address for logging
    peer_addr: String,
}

impl<R, W: Write> fmt::Debug for Connection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("err", &self.err)
            .finish()
    }
}

impl Connection<TcpStream, TcpStream> {
    /// Connect to the server named in `config`
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let stream = match config.connect_timeout() {
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in config.addr.to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(s) => {
                            connected = Some(s);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match connected {
                    Some(s) => s,
                    None => {
                        return Err(last_err
                            .unwrap_or_else(|| {
                                io::Error::new(
                                    io::ErrorKind::InvalidInput,
                                    format!("could not resolve {}", config.addr),
                                )
                            })
                            .into())
                    }
                }
            }
            None => TcpStream::connect(&config.addr)?,
        };

        if config.nodelay {
            stream.set_nodelay(true)?;
        }
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr.clone());

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let mut conn = Self::from_parts(read_stream, stream, config);
        conn.peer_addr = peer_addr;

        tracing::debug!("Connected to {}", conn.peer_addr);
        Ok(conn)
    }

    /// Connect to `addr` with default settings
    pub fn open(addr: impl Into<String>) -> Result<Self> {
        Self::connect(&Config::builder().addr(addr).build())
    }

    /// Shut the socket down
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        match self.stream.writer_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already closed by the peer
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Build a connection over any pair of stream halves
    pub fn from_parts(reader: R, writer: W, config: &Config) -> Self {
        Self {
            stream: LineStream::new(reader, writer, config.max_line_len),
            err: None,
            peer_addr: "unknown".to_string(),
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Get the underlying buffered stream
    pub fn stream(&self) -> &LineStream<R, W> {
        &self.stream
    }

    // =========================================================================
    // Sticky Error
    // =========================================================================

    /// Drain the sticky error, making the connection usable again
    pub fn take_error(&mut self) -> Option<MemtextError> {
        self.err.take()
    }

    /// Peek at the sticky error
    pub fn error(&self) -> Option<&MemtextError> {
        self.err.as_ref()
    }

    /// True while a sticky error is set
    pub fn is_broken(&self) -> bool {
        self.err.is_some()
    }

    /// Run one command. Short-circuits on a sticky error and records any
    /// new fatal error.
    fn run<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }

        let result = op(self);
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::warn!("Connection to {} is broken: {}", self.peer_addr, err);
                self.err = Some(err.clone());
            }
        }
        result
    }

    // =========================================================================
    // Wire Helpers
    // =========================================================================

    fn send(&mut self, command: &Command<'_>) -> Result<()> {
        command.validate()?;
        tracing::debug!("Sending {} to {}", command.name(), self.peer_addr);

        let bytes = encode_command(command);
        self.stream.write(&bytes)?;
        self.stream.flush()
    }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        let line = self.stream.read_line()?;
        tracing::trace!(
            "Received line from {}: {:?}",
            self.peer_addr,
            String::from_utf8_lossy(&line)
        );
        Ok(line)
    }

    /// Read one `VALUE` header and its data block. `None` on `END`.
    fn receive_value(&mut self) -> Result<Option<(String, Item)>> {
        let header = self.read_line()?;
        if is_end(&header) {
            return Ok(None);
        }

        let header = parse_value_header(&header)?;
        let block_len = header.len.checked_add(2).ok_or_else(|| {
            MemtextError::protocol("malformed response: value length too large")
        })?;
        let block = self.stream.read_exact(block_len)?;
        check_data_block(&block)?;

        let item = Item {
            value: block.slice(..header.len),
            flags: header.flags,
            cas: header.cas,
        };
        Ok(Some((header.key, item)))
    }

    /// Read one reply line that must be a success token
    fn receive_status(&mut self) -> Result<()> {
        let line = self.read_line()?;
        Reply::classify(&line).into_status()
    }

    // =========================================================================
    // Retrieval Commands
    // =========================================================================

    /// Get a single item. A miss is `MemtextError::CacheMiss`.
    pub fn get(&mut self, key: &str) -> Result<Item> {
        self.run(|c| {
            c.send(&Command::Get { key })?;

            let (_, item) = c.receive_value()?.ok_or(MemtextError::CacheMiss)?;

            let end = c.read_line()?;
            if !is_end(&end) {
                return Err(MemtextError::Protocol(format!(
                    "malformed response: expected END after get result, got {:?}",
                    String::from_utf8_lossy(&end)
                )));
            }
            Ok(item)
        })
    }

    /// Get several items with their CAS tokens. Missing keys are simply
    /// absent from the map.
    pub fn gets(&mut self, keys: &[&str]) -> Result<HashMap<String, Item>> {
        self.run(|c| {
            c.send(&Command::Gets {
                keys: keys.to_vec(),
            })?;

            let mut items = HashMap::new();
            while let Some((key, item)) = c.receive_value()? {
                items.insert(key, item);
            }
            Ok(items)
        })
    }

    // =========================================================================
    // Storage Commands
    // =========================================================================

    fn store(
        &mut self,
        mode: StorageMode,
        key: &str,
        value: &[u8],
        flags: u32,
        exptime: i64,
        noreply: bool,
    ) -> Result<()> {
        self.run(|c| {
            c.send(&Command::Store {
                mode,
                key,
                value,
                flags,
                exptime,
                noreply,
            })?;
            if noreply {
                return Ok(());
            }
            c.receive_status()
        })
    }

    /// Store this data
    pub fn set(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64, noreply: bool) -> Result<()> {
        self.store(StorageMode::Set, key, value, flags, exptime, noreply)
    }

    /// Store this data, but only if the server doesn't already hold the key
    pub fn add(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64, noreply: bool) -> Result<()> {
        self.store(StorageMode::Add, key, value, flags, exptime, noreply)
    }

    /// Store this data, but only if the server already holds the key
    pub fn replace(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64, noreply: bool) -> Result<()> {
        self.store(StorageMode::Replace, key, value, flags, exptime, noreply)
    }

    /// Add data after the existing value. Flags and exptime are ignored by the server.
    pub fn append(&mut self, key: &str, value: &[u8], noreply: bool) -> Result<()> {
        self.store(StorageMode::Append, key, value, 0, 0, noreply)
    }

    /// Add data before the existing value. Flags and exptime are ignored by the server.
    pub fn prepend(&mut self, key: &str, value: &[u8], noreply: bool) -> Result<()> {
        self.store(StorageMode::Prepend, key, value, 0, 0, noreply)
    }

    /// Store this data, but only if nobody updated it since `cas_id` was fetched
    pub fn cas(
        &mut self,
        key: &str,
        value: &[u8],
        cas_id: u64,
        flags: u32,
        exptime: i64,
        noreply: bool,
    ) -> Result<()> {
        self.store(StorageMode::Cas(cas_id), key, value, flags, exptime, noreply)
    }

    // =========================================================================
    // Deletion / Counters / Touch
    // =========================================================================

    /// Delete the item with the given key
    pub fn delete(&mut self, key: &str, noreply: bool) -> Result<()> {
        self.run(|c| {
            c.send(&Command::Delete { key, noreply })?;
            if noreply {
                return Ok(());
            }
            c.receive_status()
        })
    }

    fn counter(&mut self, op: CounterOp, key: &str, amount: u64, noreply: bool) -> Result<u64> {
        self.run(|c| {
            c.send(&Command::Counter {
                op,
                key,
                amount,
                noreply,
            })?;
            if noreply {
                return Ok(0);
            }
            let line = c.read_line()?;
            parse_counter_reply(&line)
        })
    }

    /// Increment a counter and return the new value (0 with `noreply`).
    /// The server wraps at 64 bits.
    pub fn incr(&mut self, key: &str, amount: u64, noreply: bool) -> Result<u64> {
        self.counter(CounterOp::Incr, key, amount, noreply)
    }

    /// Decrement a counter and return the new value (0 with `noreply`).
    /// The server clamps at zero.
    pub fn decr(&mut self, key: &str, amount: u64, noreply: bool) -> Result<u64> {
        self.counter(CounterOp::Decr, key, amount, noreply)
    }

    /// Update an item's expiration time without fetching it
    pub fn touch(&mut self, key: &str, exptime: i64, noreply: bool) -> Result<()> {
        self.run(|c| {
            c.send(&Command::Touch {
                key,
                exptime,
                noreply,
            })?;
            if noreply {
                return Ok(());
            }
            c.receive_status()
        })
    }

    // =========================================================================
    // Statistics / Other Commands
    // =========================================================================

    /// Default server statistics
    pub fn stats(&mut self) -> Result<Stats> {
        self.stats_command(None)
    }

    /// Statistics for a sub-group such as `items` or `slabs`
    pub fn stats_arg(&mut self, arg: &str) -> Result<Stats> {
        self.stats_command(Some(arg))
    }

    fn stats_command(&mut self, arg: Option<&str>) -> Result<Stats> {
        self.run(|c| {
            c.send(&Command::Stats { arg })?;

            let mut stats = Stats::new();
            loop {
                let line = c.read_line()?;
                if is_end(&line) {
                    return Ok(stats);
                }
                let (name, value) = parse_stat_line(&line)?;
                stats.insert(name, value);
            }
        })
    }

    /// Invalidate all items, immediately or after `delay` seconds.
    /// `None` leaves the delay token out.
    pub fn flush_all(&mut self, delay: Option<u32>, noreply: bool) -> Result<()> {
        self.run(|c| {
            c.send(&Command::FlushAll { delay, noreply })?;
            if noreply {
                return Ok(());
            }
            c.receive_status()
        })
    }

    /// Server version string
    pub fn version(&mut self) -> Result<String> {
        self.run(|c| {
            c.send(&Command::Version)?;
            let line = c.read_line()?;
            parse_version_reply(&line)
        })
    }

    /// Ask the server to close the connection. No reply is read; the caller
    /// should drop or close the connection afterwards.
    pub fn quit(&mut self) -> Result<()> {
        self.run(|c| c.send(&Command::Quit))
    }
}
