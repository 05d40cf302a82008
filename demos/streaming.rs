/// Streaming lookup example: pull one entry out of a large archive
///
/// Run with: cargo run --example streaming
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::time::Instant;
use vyr::{encode_to, ArchiveReader, Entry, Registry};

const ARCHIVE: &str = "example_streaming.vyr";

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Vyr Streaming Example ===\n");

    // 200 entries of 64KB each
    let mut registry = Registry::new();
    for i in 0..200u32 {
        let content = vec![(i % 251) as u8; 64 * 1024];
        registry.add(Entry::new(format!("blobs/{:03}.bin", i), content)?)?;
    }
    let mut out = BufWriter::new(File::create(ARCHIVE)?);
    let written = encode_to(&registry, &mut out)?;
    out.flush()?;
    println!("Wrote {} entries, {} bytes", registry.len(), written);

    let mut reader = ArchiveReader::new(File::open(ARCHIVE)?);

    let start = Instant::now();
    let entry = reader.read_entry("blobs/199.bin")?;
    println!(
        "Located {} ({} bytes) in {:?} without decoding the rest",
        String::from_utf8_lossy(entry.name()),
        entry.size(),
        start.elapsed()
    );

    let start = Instant::now();
    let everything = reader.load()?;
    println!(
        "Bulk decode of all {} entries took {:?}",
        everything.len(),
        start.elapsed()
    );

    fs::remove_file(ARCHIVE)?;
    Ok(())
}
