use crate::archive::format::{MAX_CONTENT_LENGTH, MAX_NAME_LENGTH};
use crate::error::{Result, VyrError};

/// Slots reserved by a fresh registry
const INITIAL_CAPACITY: usize = 2;

/// One named byte blob
///
/// `size()` is always the length of `content()`; the codec writes and reads
/// lengths from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: Vec<u8>,
    content: Vec<u8>,
}

impl Entry {
    /// Create an entry, rejecting names and contents the format cannot encode
    pub fn new(name: impl Into<Vec<u8>>, content: impl Into<Vec<u8>>) -> Result<Self> {
        let name = name.into();
        let content = content.into();

        if name.len() > MAX_NAME_LENGTH {
            return Err(VyrError::NameTooLong(name.len()));
        }
        if content.len() > MAX_CONTENT_LENGTH {
            return Err(VyrError::ContentTooLarge(content.len()));
        }

        Ok(Self { name, content })
    }

    /// Build from bytes already bounded by the wire format's length fields
    pub(crate) fn from_wire(name: Vec<u8>, content: Vec<u8>) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name as UTF-8, if it is valid UTF-8
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content length in bytes
    pub fn size(&self) -> u32 {
        self.content.len() as u32
    }

    /// Exact number of bytes this entry occupies in an encoded archive
    pub fn encoded_size(&self) -> u64 {
        crate::archive::format::record_size(self.name.len(), self.content.len())
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.name, self.content)
    }
}

/// In-memory, order-preserving collection of archive entries
///
/// Removal leaves a tombstone (`None`) in place; the next insertion reuses
/// the lowest tombstone before appending. The slot count never shrinks.
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Option<Entry>>,
    capacity: usize,
    format: Option<u8>,
}

impl Registry {
    /// Create an empty registry
    ///
    /// Aborts on allocation failure like any std collection; use
    /// [`Registry::create`] to observe it as an error instead.
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            format: None,
        }
    }

    /// Create an empty registry, reporting allocation failure
    pub fn create() -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(INITIAL_CAPACITY)?;
        Ok(Self {
            slots,
            capacity: INITIAL_CAPACITY,
            format: None,
        })
    }

    /// Insert an entry and return the slot index it landed in
    ///
    /// The first tombstone is reused; otherwise the entry is appended,
    /// doubling capacity when full. On failure the registry is unchanged.
    pub fn add(&mut self, entry: Entry) -> Result<usize> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(entry);
            return Ok(index);
        }

        if self.slots.len() == self.capacity {
            let grown = self.capacity.checked_mul(2).ok_or(VyrError::Allocation)?;
            self.slots.try_reserve_exact(grown - self.slots.len())?;
            self.capacity = grown;
        }

        self.slots.push(Some(entry));
        Ok(self.slots.len() - 1)
    }

    /// Tombstone the first live entry named `name` and hand it back
    pub fn remove(&mut self, name: impl AsRef<[u8]>) -> Option<Entry> {
        let name = name.as_ref();
        self.slots
            .iter_mut()
            .find(|slot| matches!(slot, Some(entry) if entry.name() == name))
            .and_then(Option::take)
    }

    /// Find the first live entry named `name`
    pub fn find(&self, name: impl AsRef<[u8]>) -> Option<&Entry> {
        let name = name.as_ref();
        self.iter().find(|entry| entry.name() == name)
    }

    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.find(name).is_some()
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().flatten()
    }

    /// Every slot in order, tombstones included
    pub fn slots(&self) -> impl Iterator<Item = Option<&Entry>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Logical slot count, tombstones included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Version tag of the archive this registry was decoded from
    pub fn format(&self) -> Option<u8> {
        self.format
    }

    pub(crate) fn set_format(&mut self, version: u8) {
        self.format = Some(version);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Entry;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Option<Entry>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter().flatten()
    }
}
