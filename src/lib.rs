//! Vyr: minimal archive container for named byte blobs
//!
//! This library implements the VYTR archive format:
//! - In-memory [`Registry`] of entries with tombstone-based removal
//! - Bulk [`encode`]/[`decode`] of the length-prefixed binary layout
//! - Streaming single-entry [`locate`] that skips the content it does not need
//!
//! No compression, encryption or checksums; entries are found by linear scan.
//!
//! # Example
//!
//! ```
//! use vyr::{decode, encode, locate, Entry, Registry};
//! use std::io::Cursor;
//!
//! let mut registry = Registry::new();
//! registry.add(Entry::new("a.txt", b"AB".to_vec())?)?;
//! registry.add(Entry::new("b.txt", Vec::new())?)?;
//!
//! let bytes = encode(&registry)?;
//! assert_eq!(decode(&bytes)?.len(), 2);
//!
//! let entry = locate(&mut Cursor::new(bytes), "a.txt")?.unwrap();
//! assert_eq!(entry.content(), b"AB");
//! # Ok::<(), vyr::VyrError>(())
//! ```

pub mod archive;
pub mod error;

// Re-export commonly used types
pub use archive::{
    decode, encode, encode_to, estimate_size, locate, read_archive, ArchiveHeader,
    ArchiveReader, ArchiveWriter, Entry, Registry, FORMAT_VERSION, HEADER_SIZE, MAGIC_NUMBER,
    MAX_CONTENT_LENGTH, MAX_NAME_LENGTH,
};
pub use error::{Result, VyrError};
