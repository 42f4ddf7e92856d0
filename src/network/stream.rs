//! Buffered line stream
//!
//! Line reads, exact-length reads and buffered writes over a byte stream.
//! This layer knows nothing about memcached; it only frames bytes.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use bytes::Bytes;

use crate::error::{MemtextError, Result};

/// Initial capacity for data block reads, so a bogus length in a header
/// does not allocate before any bytes arrive
const BLOCK_CHUNK: usize = 64 * 1024;

/// Buffered read/write halves of one connection
pub struct LineStream<R, W: Write> {
    /// Read half (buffered for efficiency)
    reader: BufReader<R>,

    /// Write half (buffered for efficiency)
    writer: BufWriter<W>,

    /// Longest accepted line, terminator excluded
    max_line_len: usize,
}

impl<R: Read, W: Write> LineStream<R, W> {
    pub fn new(reader: R, writer: W, max_line_len: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            max_line_len,
        }
    }

    /// Read one line and strip its `\r\n` (or bare `\n`).
    ///
    /// A final line cut short by EOF is returned as-is. EOF before any byte
    /// is `UnexpectedEof`. A line longer than `max_line_len` is a framing
    /// error, and leaves the stream in the middle of that line.
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let limit = self.max_line_len as u64 + 2;
        let mut line = Vec::new();
        let n = Read::take(&mut self.reader, limit).read_until(b'\n', &mut line)?;

        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into());
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        } else if n as u64 == limit {
            return Err(MemtextError::LineTooLong {
                limit: self.max_line_len,
            });
        }

        if line.len() > self.max_line_len {
            return Err(MemtextError::LineTooLong {
                limit: self.max_line_len,
            });
        }

        Ok(line)
    }

    /// Read exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        let mut buf = Vec::with_capacity(n.min(BLOCK_CHUNK));
        Read::take(&mut self.reader, n as u64).read_to_end(&mut buf)?;

        if buf.len() != n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, got {}", n, buf.len()),
            )
            .into());
        }

        Ok(Bytes::from(buf))
    }

    /// Buffer bytes for writing
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.writer.write_all(buf)?;
        Ok(())
    }

    /// Push buffered bytes to the underlying stream
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Longest accepted line
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Get a reference to the read half
    pub fn reader_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Get a reference to the write half
    pub fn writer_ref(&self) -> &W {
        self.writer.get_ref()
    }
}
