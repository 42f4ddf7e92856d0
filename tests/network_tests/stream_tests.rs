//! Tests for LineStream
//!
//! These tests verify:
//! - CRLF and bare LF line framing
//! - Line length limits
//! - Exact-length block reads
//! - Buffered writes reach the writer only on flush

use std::io::{Cursor, ErrorKind};

use memtext::network::LineStream;
use memtext::MemtextError;

// =============================================================================
// Helper Functions
// =============================================================================

fn stream_over(input: &[u8], max_line_len: usize) -> LineStream<Cursor<Vec<u8>>, Vec<u8>> {
    LineStream::new(Cursor::new(input.to_vec()), Vec::new(), max_line_len)
}

// =============================================================================
// Line Reading Tests
// =============================================================================

#[test]
fn test_read_crlf_lines() {
    let mut stream = stream_over(b"STORED\r\nEND\r\n", 1024);

    assert_eq!(stream.read_line().unwrap(), b"STORED");
    assert_eq!(stream.read_line().unwrap(), b"END");
}

#[test]
fn test_read_bare_lf_line() {
    let mut stream = stream_over(b"OK\n", 1024);
    assert_eq!(stream.read_line().unwrap(), b"OK");
}

#[test]
fn test_read_empty_line() {
    let mut stream = stream_over(b"\r\nEND\r\n", 1024);
    assert_eq!(stream.read_line().unwrap(), b"");
    assert_eq!(stream.read_line().unwrap(), b"END");
}

#[test]
fn test_partial_last_line_at_eof() {
    let mut stream = stream_over(b"SERVER_ERROR fake", 1024);
    assert_eq!(stream.read_line().unwrap(), b"SERVER_ERROR fake");
}

#[test]
fn test_eof_is_unexpected_eof() {
    let mut stream = stream_over(b"", 1024);
    let err = stream.read_line().unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::UnexpectedEof));
}

#[test]
fn test_line_at_limit() {
    let mut stream = stream_over(b"0123456789\r\n", 10);
    assert_eq!(stream.read_line().unwrap(), b"0123456789");
}

#[test]
fn test_line_too_long() {
    let mut stream = stream_over(b"0123456789A\r\n", 10);
    let err = stream.read_line().unwrap_err();
    assert!(matches!(err, MemtextError::LineTooLong { limit: 10 }));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("buffer is not enough"));
}

#[test]
fn test_line_too_long_without_terminator() {
    let mut stream = stream_over(&[b'x'; 100], 10);
    assert!(matches!(
        stream.read_line(),
        Err(MemtextError::LineTooLong { .. })
    ));
}

// =============================================================================
// Exact Read Tests
// =============================================================================

#[test]
fn test_read_exact() {
    let mut stream = stream_over(b"foobar\r\nEND\r\n", 1024);

    let block = stream.read_exact(8).unwrap();
    assert_eq!(&block[..], b"foobar\r\n");
    assert_eq!(stream.read_line().unwrap(), b"END");
}

#[test]
fn test_read_exact_binary() {
    let data: Vec<u8> = (0..=255).collect();
    let mut stream = stream_over(&data, 16);

    let block = stream.read_exact(256).unwrap();
    assert_eq!(&block[..], &data[..]);
}

#[test]
fn test_read_exact_short() {
    let mut stream = stream_over(b"foo", 1024);
    let err = stream.read_exact(8).unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::UnexpectedEof));
}

#[test]
fn test_read_exact_zero() {
    let mut stream = stream_over(b"END\r\n", 1024);
    assert!(stream.read_exact(0).unwrap().is_empty());
    assert_eq!(stream.read_line().unwrap(), b"END");
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_is_buffered_until_flush() {
    let mut stream = stream_over(b"", 1024);

    stream.write(b"version\r\n").unwrap();
    assert!(stream.writer_ref().is_empty());

    stream.flush().unwrap();
    assert_eq!(stream.writer_ref(), b"version\r\n");
}
