//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(config) = docster_config::AppConfig::parse(s)
    {
        // Anything that parses must serialize and parse back to itself.
        let rendered = config.to_toml().expect("valid config serializes");
        let reparsed = docster_config::AppConfig::parse(&rendered).expect("rendered config parses");
        assert_eq!(config, reparsed);
    }
});
