//! Tests for the reply classifier
//!
//! These tests verify:
//! - Success tokens are recognized exactly
//! - Domain error tokens map to their named errors
//! - CLIENT_ERROR / SERVER_ERROR messages are carried verbatim
//! - Anything else, including bare numbers, falls through as unrecognized

use memtext::protocol::{classify, Reply, SuccessToken};
use memtext::MemtextError;

// =============================================================================
// Success Tokens
// =============================================================================

#[test]
fn test_success_tokens() {
    let cases: [(&[u8], SuccessToken); 4] = [
        (&b"STORED"[..], SuccessToken::Stored),
        (&b"DELETED"[..], SuccessToken::Deleted),
        (&b"TOUCHED"[..], SuccessToken::Touched),
        (&b"OK"[..], SuccessToken::Ok),
    ];

    for (line, token) in cases {
        let reply = classify(line);
        assert_eq!(reply, Reply::Success(token));
        assert!(reply.is_success());
        assert!(reply.error().is_none());
        assert!(reply.into_status().is_ok());
    }
}

#[test]
fn test_success_tokens_are_exact() {
    assert!(matches!(classify(b"STORED "), Reply::Unrecognized(_)));
    assert!(matches!(classify(b"stored"), Reply::Unrecognized(_)));
    assert!(matches!(classify(b"OKAY"), Reply::Unrecognized(_)));
}

// =============================================================================
// Domain Errors
// =============================================================================

#[test]
fn test_exists_is_cas_conflict() {
    let reply = classify(b"EXISTS");
    assert_eq!(reply, Reply::CasConflict);
    assert!(matches!(reply.error(), Some(MemtextError::CasConflict)));
}

#[test]
fn test_not_stored() {
    let reply = classify(b"NOT_STORED");
    assert_eq!(reply, Reply::NotStored);
    assert!(matches!(reply.into_status(), Err(MemtextError::NotStored)));
}

#[test]
fn test_not_found() {
    let reply = classify(b"NOT_FOUND");
    assert_eq!(reply, Reply::NotFound);
    let err = reply.error().unwrap();
    assert!(matches!(err, MemtextError::NotFound));
    assert!(err.is_domain());
    assert!(!err.is_fatal());
}

#[test]
fn test_domain_errors_are_distinct() {
    let exists = classify(b"EXISTS").error().unwrap();
    let not_stored = classify(b"NOT_STORED").error().unwrap();
    let not_found = classify(b"NOT_FOUND").error().unwrap();

    assert!(!matches!(exists, MemtextError::NotStored | MemtextError::NotFound));
    assert!(!matches!(not_stored, MemtextError::CasConflict | MemtextError::NotFound));
    assert!(!matches!(not_found, MemtextError::CasConflict | MemtextError::NotStored));
}

// =============================================================================
// Server-Reported Errors
// =============================================================================

#[test]
fn test_generic_error() {
    let reply = classify(b"ERROR");
    assert_eq!(reply, Reply::GenericError);
    let err = reply.error().unwrap();
    assert!(matches!(err, MemtextError::ReplyError));
    assert!(err.is_server_reported());
}

#[test]
fn test_client_error_message() {
    let reply = classify(b"CLIENT_ERROR bad data chunk");
    assert_eq!(reply, Reply::ClientError(b"bad data chunk"));

    match reply.error() {
        Some(MemtextError::ClientError(msg)) => assert_eq!(msg, "bad data chunk"),
        other => panic!("Expected ClientError, got {:?}", other),
    }
}

#[test]
fn test_server_error_message() {
    let reply = classify(b"SERVER_ERROR out of memory storing object");

    match reply.error() {
        Some(MemtextError::ServerError(msg)) => {
            assert_eq!(msg, "out of memory storing object")
        }
        other => panic!("Expected ServerError, got {:?}", other),
    }
}

#[test]
fn test_error_prefix_requires_space() {
    // Without the separating space this is not a client error
    assert!(matches!(classify(b"CLIENT_ERROR"), Reply::Unrecognized(_)));
    assert!(matches!(classify(b"SERVER_ERRORx"), Reply::Unrecognized(_)));
}

#[test]
fn test_error_display() {
    let err = classify(b"SERVER_ERROR busy").error().unwrap();
    assert_eq!(err.to_string(), "memcache: server error: busy");

    let err = classify(b"CLIENT_ERROR line too long").error().unwrap();
    assert_eq!(err.to_string(), "memcache: client error: line too long");
}

// =============================================================================
// Unrecognized Lines
// =============================================================================

#[test]
fn test_numbers_fall_through() {
    assert_eq!(classify(b"44"), Reply::Unrecognized(b"44"));
    assert!(classify(b"44").error().is_none());
}

#[test]
fn test_unrecognized_status_is_protocol_error() {
    match classify(b"foobar").into_status() {
        Err(MemtextError::Protocol(msg)) => assert_eq!(msg, "unknown reply type: foobar"),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_end_is_not_a_reply_token() {
    assert!(matches!(classify(b"END"), Reply::Unrecognized(_)));
}
