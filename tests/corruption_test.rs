//! Corruption detection suite
//!
//! Malformed archives must be rejected by the bulk decoder and the streaming
//! lookup alike, with the same error kind, and never panic.

use std::io::Cursor;
use vyr::{decode, encode, locate, Entry, Registry, VyrError};

/// Helper: Create a valid test archive
fn create_test_archive() -> Vec<u8> {
    let mut registry = Registry::new();
    registry.add(Entry::new("test.txt", b"Hello, World!".to_vec()).unwrap()).unwrap();
    registry.add(Entry::new("data.bin", vec![0xABu8; 1024]).unwrap()).unwrap();
    registry.add(Entry::new("empty", Vec::new()).unwrap()).unwrap();
    encode(&registry).unwrap()
}

/// Helper: Streaming lookup for a name that is not in any test archive
fn locate_absent(bytes: &[u8]) -> vyr::Result<Option<Entry>> {
    locate(&mut Cursor::new(bytes.to_vec()), "no-such-entry-in-this-archive")
}

#[test]
fn test_corrupted_magic_number() {
    let mut bytes = create_test_archive();
    bytes[0] = 0xFF;

    match decode(&bytes) {
        Err(VyrError::BadMagic { found }) => assert_eq!(found, vec![0xFF, 0x59, 0x54, 0x52]),
        other => panic!("Expected BadMagic, got: {:?}", other),
    }
    match locate(&mut Cursor::new(bytes), "test.txt") {
        Err(VyrError::BadMagic { .. }) => {}
        other => panic!("Expected BadMagic, got: {:?}", other),
    }
}

#[test]
fn test_unsupported_version() {
    for version in [0u8, 2, 99, 255] {
        let mut bytes = create_test_archive();
        bytes[4] = version;

        match decode(&bytes) {
            Err(VyrError::UnsupportedVersion(v)) => assert_eq!(v, version),
            other => panic!("Expected UnsupportedVersion, got: {:?}", other),
        }
        match locate(&mut Cursor::new(bytes), "test.txt") {
            Err(VyrError::UnsupportedVersion(v)) => assert_eq!(v, version),
            other => panic!("Expected UnsupportedVersion, got: {:?}", other),
        }
    }
}

#[test]
fn test_magic_checked_before_version() {
    let mut bytes = create_test_archive();
    bytes[1] = b'X';
    bytes[4] = 2;

    assert!(matches!(decode(&bytes), Err(VyrError::BadMagic { .. })));
    assert!(matches!(locate_absent(&bytes), Err(VyrError::BadMagic { .. })));
}

#[test]
fn test_empty_input() {
    assert!(matches!(decode(&[]), Err(VyrError::TruncatedInput { .. })));
    assert!(matches!(locate_absent(&[]), Err(VyrError::TruncatedInput { .. })));
}

#[test]
fn test_every_strict_prefix_is_truncated() {
    let bytes = create_test_archive();

    for len in 0..bytes.len() {
        let prefix = &bytes[..len];

        match decode(prefix) {
            Err(VyrError::TruncatedInput { .. }) => {}
            other => panic!("decode of {}-byte prefix: {:?}", len, other.map(|r| r.len())),
        }
        match locate_absent(prefix) {
            Err(VyrError::TruncatedInput { .. }) => {}
            other => panic!("locate on {}-byte prefix: {:?}", len, other),
        }
    }
}

#[test]
fn test_inflated_entry_count() {
    let mut bytes = create_test_archive();
    bytes[5..9].copy_from_slice(&u32::MAX.to_le_bytes());

    assert!(matches!(decode(&bytes), Err(VyrError::TruncatedInput { .. })));
    assert!(matches!(locate_absent(&bytes), Err(VyrError::TruncatedInput { .. })));

    // Entries before the damage are still reachable by streaming lookup
    let entry = locate(&mut Cursor::new(bytes), "data.bin").unwrap().unwrap();
    assert_eq!(entry.size(), 1024);
}

#[test]
fn test_deflated_entry_count() {
    // A smaller count is a shorter, valid archive with trailing bytes
    let mut bytes = create_test_archive();
    bytes[5..9].copy_from_slice(&1u32.to_le_bytes());

    let registry = decode(&bytes).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.find("test.txt").is_some());
    assert!(locate(&mut Cursor::new(bytes), "data.bin").unwrap().is_none());
}

#[test]
fn test_oversized_name_length() {
    let mut bytes = create_test_archive();
    // First record's name length sits right after the 9-byte header
    bytes[9..11].copy_from_slice(&u16::MAX.to_le_bytes());

    match decode(&bytes) {
        Err(VyrError::TruncatedInput { context, needed, .. }) => {
            assert_eq!(context, "entry name");
            assert_eq!(needed, u16::MAX as u64);
        }
        other => panic!("Expected TruncatedInput, got: {:?}", other),
    }
    assert!(matches!(locate_absent(&bytes), Err(VyrError::TruncatedInput { .. })));
}

#[test]
fn test_oversized_content_length() {
    let mut bytes = create_test_archive();
    // header (9) + name_len (2) + "test.txt" (8)
    bytes[19..23].copy_from_slice(&u32::MAX.to_le_bytes());

    match decode(&bytes) {
        Err(VyrError::TruncatedInput { context, needed, .. }) => {
            assert_eq!(context, "entry content");
            assert_eq!(needed, u32::MAX as u64);
        }
        other => panic!("Expected TruncatedInput, got: {:?}", other),
    }
    assert!(matches!(locate_absent(&bytes), Err(VyrError::TruncatedInput { .. })));
    assert!(matches!(
        locate(&mut Cursor::new(bytes), "test.txt"),
        Err(VyrError::TruncatedInput { .. })
    ));
}
