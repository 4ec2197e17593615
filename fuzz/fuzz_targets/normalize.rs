#![no_main]

use designgen_codegen::normalize_source;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only source that parses can be normalized
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(once) = normalize_source(s) {
            // A normalized file is a fixed point
            let twice = normalize_source(&once).expect("normalized output must parse");
            assert_eq!(once, twice);
        }
    }
});
