#![no_main]

use libfuzzer_sys::fuzz_target;
use verdict_engine::allowlist::Allowlist;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let _ = Allowlist::parse(raw);
});
