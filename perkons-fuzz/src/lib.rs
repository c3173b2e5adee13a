//! Fuzzing entry points for perkons-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_load

use perkons_core::Kit;

pub fn fuzz_load(data: &[u8]) {
    // Try to decode - should never panic
    let _ = Kit::from_buffer(data);
}

pub fn fuzz_round_trip(data: &[u8]) {
    // Anything that loads with in-range controls must save back identically
    if let Ok(kit) = Kit::from_buffer(data) {
        if let Ok(saved) = kit.to_buffer() {
            assert_eq!(&saved[..], data);
        }
    }
}
