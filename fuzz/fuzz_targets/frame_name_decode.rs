//! Fuzz target for V2 record key decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mmstack::meta::fuzz_decode_frame_name;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(key) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_decode_frame_name(key);
});
