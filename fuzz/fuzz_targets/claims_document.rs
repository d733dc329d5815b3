#![no_main]

use libfuzzer_sys::fuzz_target;
use verdict_engine::claims::{apply_mutation_probe, parse_claims, rewrite_uncertain};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut claims) = parse_claims(raw) else {
        return;
    };
    rewrite_uncertain(&mut claims);
    let _ = apply_mutation_probe(&mut claims);
});
