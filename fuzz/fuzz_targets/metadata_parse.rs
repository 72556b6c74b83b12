//! Fuzz target for full metadata parsing.
//!
//! Arbitrary text goes through version detection and both dialect reducers.
//! Schema errors are expected; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mmstack::meta::fuzz_parse_metadata;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let text = String::from_utf8_lossy(data);
    let _ = fuzz_parse_metadata(&text);
});
