//! Fuzz target for the brace matcher.
//!
//! Run with: cargo +nightly fuzz run fuzz_brace_matcher
//!
//! The first byte picks the start offset; the rest is the text.

#![no_main]

use docster_core::extract::find_matching_brace;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let start = seed as usize % (text.len() + 1);

    if let Some(close) = find_matching_brace(text, start) {
        assert!(close >= start);
        assert_eq!(text.as_bytes()[close], b'}');
    }
});
