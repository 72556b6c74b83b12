//! Fuzz target for the metadata lexer.
//!
//! This fuzzer feeds arbitrary text to the line lexer, checking for panics,
//! crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mmstack::meta::lexer::fuzz_lex;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let text = String::from_utf8_lossy(data);
    let _ = fuzz_lex(&text);
});
