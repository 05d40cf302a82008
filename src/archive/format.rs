use crate::error::{Result, VyrError};
use std::io::Write;

/// Magic number: 'V' 'Y' 'T' 'R'
pub const MAGIC_NUMBER: [u8; 4] = [0x56, 0x59, 0x54, 0x52];

/// The only format version this implementation reads or writes
pub const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: magic + version + entry count
pub const HEADER_SIZE: u64 = 4 + 1 + 4;

/// Fixed per-record overhead: u16 name length + u32 content length
pub const RECORD_OVERHEAD: u64 = 2 + 4;

/// Maximum entry name length in bytes
pub const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// Maximum entry content length in bytes
pub const MAX_CONTENT_LENGTH: usize = u32::MAX as usize;

/// Archive header
///
/// Structure (9 bytes, little-endian):
/// - Magic: "VYTR" (4 bytes)
/// - Version: uint8 (1 byte)
/// - Entry Count: uint32 (4 bytes)
///
/// Followed by `entry_count` records:
/// - Name Length: uint16 (2 bytes)
/// - Name: variable (raw bytes, no terminator)
/// - Content Length: uint32 (4 bytes)
/// - Content: variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub version: u8,
    pub entry_count: u32,
}

impl ArchiveHeader {
    pub fn new(entry_count: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            entry_count,
        }
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC_NUMBER)?;
        writer.write_all(&[self.version])?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        Ok(())
    }

    /// Read and validate the header: magic, then version, then count.
    ///
    /// Both the bulk and the streaming decoders go through here, so they
    /// reject exactly the same inputs.
    pub(crate) fn read_from<S: RecordSource>(source: &mut S) -> Result<Self> {
        let available = source.remaining().min(MAGIC_NUMBER.len() as u64) as usize;
        let mut magic = [0u8; 4];
        source.read_raw(&mut magic[..available])?;
        check_magic(&magic[..available])?;

        let version = source.read_u8("format version")?;
        if version != FORMAT_VERSION {
            return Err(VyrError::UnsupportedVersion(version));
        }

        let entry_count = source.read_u32("entry count")?;

        Ok(Self {
            version,
            entry_count,
        })
    }
}

/// Validate a (possibly short) magic prefix.
///
/// A mismatching byte is `BadMagic`; a matching but incomplete prefix is
/// `TruncatedInput`.
pub fn check_magic(prefix: &[u8]) -> Result<()> {
    let len = prefix.len().min(MAGIC_NUMBER.len());
    if prefix[..len] != MAGIC_NUMBER[..len] {
        return Err(VyrError::BadMagic {
            found: prefix[..len].to_vec(),
        });
    }
    if len < MAGIC_NUMBER.len() {
        return Err(VyrError::truncated(
            "magic number",
            MAGIC_NUMBER.len() as u64,
            len as u64,
        ));
    }
    Ok(())
}

/// Encoded size of one record
pub fn record_size(name_len: usize, content_len: usize) -> u64 {
    RECORD_OVERHEAD + name_len as u64 + content_len as u64
}

/// Bounds-checked access to archive bytes.
///
/// Implementors only supply raw reads and skips; every checked helper
/// compares the declared length against `remaining()` before touching the
/// underlying bytes.
pub(crate) trait RecordSource {
    /// Bytes left between the cursor and the end of the input
    fn remaining(&self) -> u64;

    /// Fill `buf` exactly. Callers have already checked `remaining()`.
    fn read_raw(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Advance without reading. Callers have already checked `remaining()`.
    fn skip_raw(&mut self, len: u64) -> Result<()>;

    fn ensure(&self, needed: u64, context: &'static str) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(VyrError::truncated(context, needed, remaining));
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        self.ensure(N as u64, context)?;
        let mut buf = [0u8; N];
        self.read_raw(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(context)?[0])
    }

    fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array(context)?))
    }

    fn read_u32(&mut self, context: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(context)?))
    }

    /// Read `len` bytes into `buf`, replacing its contents
    fn read_bytes_into(
        &mut self,
        buf: &mut Vec<u8>,
        len: usize,
        context: &'static str,
    ) -> Result<()> {
        self.ensure(len as u64, context)?;
        buf.clear();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
        self.read_raw(buf)
    }

    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_bytes_into(&mut buf, len, context)?;
        Ok(buf)
    }

    fn skip(&mut self, len: u64, context: &'static str) -> Result<()> {
        self.ensure(len, context)?;
        self.skip_raw(len)
    }
}

/// Cursor over an immutable in-memory archive
pub(crate) struct SliceCursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl RecordSource for SliceCursor<'_> {
    fn remaining(&self) -> u64 {
        (self.input.len() - self.pos) as u64
    }

    fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.input[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn skip_raw(&mut self, len: u64) -> Result<()> {
        self.pos += len as usize;
        Ok(())
    }
}
