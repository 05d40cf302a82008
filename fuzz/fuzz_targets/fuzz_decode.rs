#![no_main]

use libfuzzer_sys::fuzz_target;
use vyr::{decode, encode, estimate_size};

fuzz_target!(|data: &[u8]| {
    // Try to decode - should never panic
    let registry = match decode(data) {
        Ok(r) => r,
        Err(_) => return, // Expected for invalid data
    };

    // Anything that decodes must re-encode to exactly the estimated size
    let bytes = encode(&registry).expect("re-encode of decoded registry");
    assert_eq!(bytes.len() as u64, estimate_size(&registry));

    // And decode again to the same entries
    let again = decode(&bytes).expect("decode of re-encoded archive");
    assert!(registry.iter().eq(again.iter()));
});
