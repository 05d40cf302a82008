//! Generate seed corpus for fuzzing

use std::fs;
use vyr::{encode, Entry, Registry};

fn write_seed(dir: &str, name: &str, entries: &[(&str, &[u8])]) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = Registry::new();
    for (entry_name, content) in entries {
        registry.add(Entry::new(*entry_name, *content)?)?;
    }
    let path = format!("{}/{}", dir, name);
    fs::write(&path, encode(&registry)?)?;
    println!("✓ Generated: {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let binary: Vec<u8> = (0..=255).collect();
    let large = b"This is test data for the fuzzer. ".repeat(100);

    for dir in ["fuzz/corpus/fuzz_decode", "fuzz/corpus/fuzz_locate"] {
        fs::create_dir_all(dir)?;
        println!("Generating seed corpus in {}...", dir);

        write_seed(dir, "seed_empty.vyr", &[])?;
        write_seed(dir, "seed_single_small.vyr", &[("test.txt", b"Hello, World!")])?;
        write_seed(
            dir,
            "seed_multi.vyr",
            &[
                ("file1.txt", b"First file"),
                ("file2.txt", b"Second file"),
                ("dir/file3.txt", b"Third file in directory"),
            ],
        )?;
        write_seed(dir, "seed_large.vyr", &[("large.txt", &large)])?;
        write_seed(dir, "seed_binary.vyr", &[("binary.bin", &binary)])?;
        write_seed(dir, "seed_zero_length.vyr", &[("empty.txt", b"")])?;
    }

    Ok(())
}
