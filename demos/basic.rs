/// Basic example demonstrating archive creation and reading
///
/// Run with: cargo run --example basic
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use vyr::{decode, ArchiveWriter};

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Vyr Basic Example ===\n");

    // Create an archive
    println!("1. Creating archive...");
    create_archive()?;

    // Read from the archive
    println!("\n2. Reading from archive...");
    read_archive()?;

    fs::remove_file("example_basic.vyr")?;
    println!("\n✓ Example complete!");
    Ok(())
}

fn create_archive() -> Result<(), Box<dyn Error>> {
    let file = BufWriter::new(File::create("example_basic.vyr")?);
    let mut writer = ArchiveWriter::new(file)?;

    // Add some files with different content
    writer.add_file(
        "readme.txt",
        b"This is a readme file for the basic example.".to_vec(),
    )?;
    writer.add_file(
        "data.json",
        br#"{"name": "Basic Example", "version": "1.0.0"}"#.to_vec(),
    )?;
    writer.add_file("notes.md", b"# Notes\n\nThis is a markdown file.".to_vec())?;
    writer.add_file("binary.dat", vec![0u8; 1000])?;

    // Changed our mind about the notes; the slot is reused by the next add
    writer.remove_file("notes.md");
    writer.add_file("todo.md", b"- ship it".to_vec())?;

    println!("   Archive will be {} bytes", writer.estimated_size());
    writer.finalize()?;
    println!("   ✓ Archive created: example_basic.vyr");

    Ok(())
}

fn read_archive() -> Result<(), Box<dyn Error>> {
    let bytes = fs::read("example_basic.vyr")?;
    let registry = decode(&bytes)?;

    // List all files
    println!("   Files in archive (format v{:?}):", registry.format());
    for entry in &registry {
        println!(
            "     - {} ({} bytes)",
            String::from_utf8_lossy(entry.name()),
            entry.size()
        );
    }

    // Read specific file
    println!("\n   Reading readme.txt:");
    if let Some(readme) = registry.find("readme.txt") {
        println!("     {}", String::from_utf8_lossy(readme.content()));
    }

    Ok(())
}
