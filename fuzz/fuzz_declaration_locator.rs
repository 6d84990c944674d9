//! Fuzz target for the declaration locator.
//!
//! Run with: cargo +nightly fuzz run fuzz_declaration_locator
//!
//! Input is `identifier\ncontent`.

#![no_main]

use docster_core::extract::{BlockKind, extract_code_block};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Some((identifier, content)) = input.split_once('\n') else {
        return;
    };

    if let Some(block) = extract_code_block(content, identifier) {
        match block.kind {
            BlockKind::Braced | BlockKind::Bare => {
                assert!(content[block.start..].starts_with(block.as_str()));
            }
            BlockKind::Truncated => {
                assert!(block.as_str().ends_with("... (Block end not reliably found)\n"));
            }
        }
    }
});
