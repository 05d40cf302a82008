use crate::archive::format::{ArchiveHeader, RecordSource, SliceCursor};
use crate::archive::registry::{Entry, Registry};
use crate::error::{Result, VyrError};
use std::io::{Read, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};

/// Decode a complete in-memory archive
///
/// All-or-nothing: any bounds or header failure discards the partially
/// built registry. Bytes past the last declared record are ignored.
pub fn decode(input: &[u8]) -> Result<Registry> {
    let mut cursor = SliceCursor::new(input);
    let header = ArchiveHeader::read_from(&mut cursor)?;

    let mut registry = Registry::create()?;
    for _ in 0..header.entry_count {
        let name_len = cursor.read_u16("name length")?;
        let name = cursor.read_bytes(name_len as usize, "entry name")?;
        let data_len = cursor.read_u32("content length")?;
        let content = cursor.read_bytes(data_len as usize, "entry content")?;
        registry.add(Entry::from_wire(name, content))?;
    }
    registry.set_format(header.version);

    tracing::debug!(
        entries = header.entry_count,
        consumed = cursor.position(),
        trailing = cursor.remaining(),
        "decoded archive"
    );
    Ok(registry)
}

/// Read a whole archive from `source` and decode it
///
/// The source position is restored afterwards.
pub fn read_archive<R: Read + Seek>(source: &mut R) -> Result<Registry> {
    let mut guard = PositionGuard::new(source)?;

    let len = guard.seek(SeekFrom::End(0))?;
    guard.seek(SeekFrom::Start(0))?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(usize::try_from(len).map_err(|_| VyrError::Allocation)?)?;
    guard.read_to_end(&mut buf)?;

    let registry = decode(&buf)?;
    guard.restore()?;
    Ok(registry)
}

/// Find and extract a single entry without decoding the rest of the archive
///
/// Only record headers and names are read; content of non-matching entries
/// is skipped with a seek. The source position is restored on every exit
/// path. Header validation and truncation checks match [`decode`].
///
/// Each skip is a relative seek, which empties a `BufReader`'s buffer; pass
/// the `File` itself for archives with many small entries.
pub fn locate<R: Read + Seek>(source: &mut R, name: impl AsRef<[u8]>) -> Result<Option<Entry>> {
    let target = name.as_ref();
    let mut guard = PositionGuard::new(source)?;
    let found = scan_for(&mut *guard, target)?;
    guard.restore()?;
    Ok(found)
}

fn scan_for<R: Read + Seek>(source: &mut R, target: &[u8]) -> Result<Option<Entry>> {
    let mut cursor = StreamCursor::new(source)?;
    let header = ArchiveHeader::read_from(&mut cursor)?;

    let mut name_buf = Vec::new();
    for index in 0..header.entry_count {
        let name_len = cursor.read_u16("name length")? as usize;

        // Names of a different length cannot match; skip them unread
        let matched = if name_len == target.len() {
            cursor.read_bytes_into(&mut name_buf, name_len, "entry name")?;
            name_buf == target
        } else {
            cursor.skip(name_len as u64, "entry name")?;
            false
        };

        let data_len = cursor.read_u32("content length")?;

        if matched {
            let content = cursor.read_bytes(data_len as usize, "entry content")?;
            tracing::trace!(index, size = data_len, "located entry");
            return Ok(Some(Entry::from_wire(name_buf, content)));
        }

        cursor.skip(data_len as u64, "entry content")?;
    }

    Ok(None)
}

fn scan_names<R: Read + Seek>(source: &mut R) -> Result<Vec<(Vec<u8>, u32)>> {
    let mut cursor = StreamCursor::new(source)?;
    let header = ArchiveHeader::read_from(&mut cursor)?;

    let mut names = Vec::new();
    for _ in 0..header.entry_count {
        let name_len = cursor.read_u16("name length")?;
        let name = cursor.read_bytes(name_len as usize, "entry name")?;
        let data_len = cursor.read_u32("content length")?;
        cursor.skip(data_len as u64, "entry content")?;
        names.try_reserve(1)?;
        names.push((name, data_len));
    }

    Ok(names)
}

/// Archive reader over a seekable source
///
/// Every operation leaves the source where it found it.
pub struct ArchiveReader<R: Read + Seek> {
    source: R,
}

impl<R: Read + Seek> ArchiveReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Look up a single entry by name
    pub fn locate(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Entry>> {
        locate(&mut self.source, name)
    }

    /// Like [`ArchiveReader::locate`], but absence is an error
    pub fn read_entry(&mut self, name: impl AsRef<[u8]>) -> Result<Entry> {
        let name = name.as_ref();
        self.locate(name)?
            .ok_or_else(|| VyrError::EntryNotFound(String::from_utf8_lossy(name).into_owned()))
    }

    /// Names and sizes of every entry in archive order, content left unread
    pub fn list_entries(&mut self) -> Result<Vec<(Vec<u8>, u32)>> {
        let mut guard = PositionGuard::new(&mut self.source)?;
        let names = scan_names(&mut *guard)?;
        guard.restore()?;
        Ok(names)
    }

    /// Names of every entry in archive order
    pub fn list_names(&mut self) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .list_entries()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Decode the whole archive
    pub fn load(&mut self) -> Result<Registry> {
        read_archive(&mut self.source)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Bounds-checked cursor over a seekable stream
///
/// The stream length is measured once up front so skips past the end are
/// caught the same way the slice cursor catches them.
struct StreamCursor<'a, R: Read + Seek> {
    source: &'a mut R,
    position: u64,
    end: u64,
}

impl<'a, R: Read + Seek> StreamCursor<'a, R> {
    fn new(source: &'a mut R) -> Result<Self> {
        let end = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        Ok(Self {
            source,
            position: 0,
            end,
        })
    }
}

impl<R: Read + Seek> RecordSource for StreamCursor<'_, R> {
    fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.position)
    }

    fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.source.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn skip_raw(&mut self, len: u64) -> Result<()> {
        let offset = i64::try_from(len).map_err(|_| VyrError::truncated("skip", len, 0))?;
        self.source.seek(SeekFrom::Current(offset))?;
        self.position += len;
        Ok(())
    }
}

/// Saves a source's position and puts it back when done
///
/// `restore` reports seek failures. A guard dropped without `restore`
/// (error paths) seeks back best-effort.
struct PositionGuard<'a, R: Seek> {
    source: &'a mut R,
    origin: u64,
    armed: bool,
}

impl<'a, R: Seek> PositionGuard<'a, R> {
    fn new(source: &'a mut R) -> Result<Self> {
        let origin = source.stream_position()?;
        Ok(Self {
            source,
            origin,
            armed: true,
        })
    }

    fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.source.seek(SeekFrom::Start(self.origin))?;
        Ok(())
    }
}

impl<R: Seek> Deref for PositionGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &*self.source
    }
}

impl<R: Seek> DerefMut for PositionGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut *self.source
    }
}

impl<R: Seek> Drop for PositionGuard<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.source.seek(SeekFrom::Start(self.origin));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::writer::encode;
    use std::io::Cursor;

    fn sample() -> Vec<u8> {
        let mut registry = Registry::new();
        registry.add(Entry::new("a.txt", b"AB".to_vec()).unwrap()).unwrap();
        registry.add(Entry::new("b.txt", Vec::new()).unwrap()).unwrap();
        registry.add(Entry::new("c/long.bin", vec![0x5Au8; 300]).unwrap()).unwrap();
        encode(&registry).unwrap()
    }

    #[test]
    fn test_decode_sets_format() {
        let registry = decode(&sample()).unwrap();
        assert_eq!(registry.format(), Some(1));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = sample();
        bytes.extend_from_slice(b"junk");
        assert_eq!(decode(&bytes).unwrap().len(), 3);
    }

    #[test]
    fn test_locate_restores_position() {
        let mut source = Cursor::new(sample());
        source.set_position(7);

        let entry = locate(&mut source, "c/long.bin").unwrap().unwrap();
        assert_eq!(entry.size(), 300);
        assert_eq!(source.position(), 7);

        assert!(locate(&mut source, "missing").unwrap().is_none());
        assert_eq!(source.position(), 7);
    }

    #[test]
    fn test_locate_restores_position_on_error() {
        let mut bytes = sample();
        bytes[4] = 9;
        let mut source = Cursor::new(bytes);
        source.set_position(3);

        let result = locate(&mut source, "a.txt");
        assert!(matches!(result, Err(VyrError::UnsupportedVersion(9))));
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn test_locate_same_length_names() {
        // a.txt and b.txt share a length, so both names are read and compared
        let mut source = Cursor::new(sample());
        let entry = locate(&mut source, "b.txt").unwrap().unwrap();
        assert_eq!(entry.name(), b"b.txt");
        assert!(entry.content().is_empty());
    }

    #[test]
    fn test_skip_past_end_is_truncation() {
        // Drop the last content byte: the final skip would run off the end
        let mut bytes = sample();
        bytes.pop();
        let mut source = Cursor::new(bytes);

        let result = locate(&mut source, "not-there");
        assert!(matches!(result, Err(VyrError::TruncatedInput { .. })));
    }

    #[test]
    fn test_reader_lists_entries() {
        let mut reader = ArchiveReader::new(Cursor::new(sample()));
        let entries = reader.list_entries().unwrap();
        assert_eq!(
            entries,
            vec![
                (b"a.txt".to_vec(), 2),
                (b"b.txt".to_vec(), 0),
                (b"c/long.bin".to_vec(), 300),
            ]
        );
        assert_eq!(reader.list_names().unwrap().len(), 3);
    }

    #[test]
    fn test_reader_read_entry_not_found() {
        let mut reader = ArchiveReader::new(Cursor::new(sample()));
        match reader.read_entry("nope.txt") {
            Err(VyrError::EntryNotFound(name)) => assert_eq!(name, "nope.txt"),
            other => panic!("Expected EntryNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_read_archive_restores_position() {
        let mut source = Cursor::new(sample());
        source.set_position(11);
        let registry = read_archive(&mut source).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(source.position(), 11);
    }
}
