#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use vyr::{decode, locate};

fuzz_target!(|data: &[u8]| {
    // Use the first byte to pick a name length, the rest is the archive
    let Some((&name_len, archive)) = data.split_first() else {
        return;
    };
    let name = vec![b'a'; (name_len % 16) as usize];

    let mut source = Cursor::new(archive);
    let streamed = locate(&mut source, &name);

    // Position is always restored
    assert_eq!(source.position(), 0);

    // Header failures must match the bulk decoder
    if let (Err(streamed), Err(bulk)) = (&streamed, &decode(archive)) {
        assert_eq!(
            std::mem::discriminant(streamed),
            std::mem::discriminant(bulk)
        );
    }
});
