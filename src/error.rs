use std::io;
use thiserror::Error;

/// Result type for vyr operations
pub type Result<T> = std::result::Result<T, VyrError>;

/// Unified error type for all vyr operations
#[derive(Debug, Error)]
pub enum VyrError {
    // Storage errors
    #[error("Failed to allocate registry storage")]
    Allocation,

    // Archive errors
    #[error("Invalid magic number in archive header: {found:02X?}")]
    BadMagic { found: Vec<u8> },

    #[error("Unsupported archive version: {0}")]
    UnsupportedVersion(u8),

    #[error("Truncated input while reading {context}: need {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        context: &'static str,
        needed: u64,
        remaining: u64,
    },

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    // Entry limits
    #[error("Entry name too long: {0} bytes (max 65535)")]
    NameTooLong(usize),

    #[error("Entry content too large: {0} bytes (max 4294967295)")]
    ContentTooLarge(usize),

    #[error("Too many entries for one archive: {0} (max 4294967295)")]
    TooManyEntries(usize),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VyrError {
    /// Shorthand for a bounds failure while parsing
    pub(crate) fn truncated(context: &'static str, needed: u64, remaining: u64) -> Self {
        VyrError::TruncatedInput {
            context,
            needed,
            remaining,
        }
    }
}

impl From<std::collections::TryReserveError> for VyrError {
    fn from(_: std::collections::TryReserveError) -> Self {
        VyrError::Allocation
    }
}
