mod format;
mod reader;
mod registry;
mod writer;

pub use format::{
    check_magic, record_size, ArchiveHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC_NUMBER,
    MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, RECORD_OVERHEAD,
};
pub use reader::{decode, locate, read_archive, ArchiveReader};
pub use registry::{Entry, Registry};
pub use writer::{encode, encode_to, estimate_size, ArchiveWriter};
