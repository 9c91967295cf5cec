//! Fuzz target for the instruction parser
//!
//! Arbitrary text must either parse into a roster or return an error. When it
//! parses, every declared constraint must refer to participants in the roster.

#![no_main]

use libfuzzer_sys::fuzz_target;
use santa_core::parse_instructions;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(roster) = parse_instructions(text) {
        assert!(!roster.is_empty());
        for (giver, receiver) in roster.forced_pairs() {
            assert!(roster.get(giver).is_some());
            assert!(roster.get(receiver).is_some());
        }
    }
});
