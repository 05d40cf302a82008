use crate::archive::format::{ArchiveHeader, HEADER_SIZE};
use crate::archive::registry::{Entry, Registry};
use crate::error::{Result, VyrError};
use std::io::Write;

/// Exact encoded length of `registry`, computed without encoding it
pub fn estimate_size(registry: &Registry) -> u64 {
    HEADER_SIZE + registry.iter().map(Entry::encoded_size).sum::<u64>()
}

/// Serialize `registry` into a sink, returning the number of bytes written
///
/// Tombstones contribute nothing; the entry count written is the number of
/// live entries actually emitted.
pub fn encode_to<W: Write>(registry: &Registry, mut writer: W) -> Result<u64> {
    let live = registry.len();
    let entry_count = u32::try_from(live).map_err(|_| VyrError::TooManyEntries(live))?;

    ArchiveHeader::new(entry_count).write_to(&mut writer)?;
    let mut written = HEADER_SIZE;

    for entry in registry {
        let name = entry.name();
        writer.write_all(&(name.len() as u16).to_le_bytes())?;
        writer.write_all(name)?;
        writer.write_all(&entry.size().to_le_bytes())?;
        writer.write_all(entry.content())?;
        written += entry.encoded_size();
    }

    tracing::trace!(entries = entry_count, bytes = written, "encoded archive");
    Ok(written)
}

/// Serialize `registry` into a buffer sized up front by [`estimate_size`]
pub fn encode(registry: &Registry) -> Result<Vec<u8>> {
    let size = usize::try_from(estimate_size(registry)).map_err(|_| VyrError::Allocation)?;
    let mut out = Vec::new();
    out.try_reserve_exact(size)?;
    encode_to(registry, &mut out)?;
    Ok(out)
}

/// Archive writer that collects entries and encodes them into a sink
///
/// Nothing is written until [`ArchiveWriter::finalize`].
pub struct ArchiveWriter<W: Write> {
    sink: W,
    registry: Registry,
}

impl<W: Write> ArchiveWriter<W> {
    /// Create a writer targeting `sink`
    pub fn new(sink: W) -> Result<Self> {
        Ok(Self {
            sink,
            registry: Registry::create()?,
        })
    }

    /// Add a named blob
    pub fn add_file(&mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Result<()> {
        self.add_entry(Entry::new(name, data)?)
    }

    /// Add a prebuilt entry
    pub fn add_entry(&mut self, entry: Entry) -> Result<()> {
        self.registry.add(entry)?;
        Ok(())
    }

    /// Drop a previously added blob; the slot is reused by the next add
    pub fn remove_file(&mut self, name: impl AsRef<[u8]>) -> Option<Entry> {
        self.registry.remove(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bytes `finalize` will write
    pub fn estimated_size(&self) -> u64 {
        estimate_size(&self.registry)
    }

    /// Encode every entry into the sink, flush it and hand it back
    pub fn finalize(mut self) -> Result<W> {
        encode_to(&self.registry, &mut self.sink)?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}
