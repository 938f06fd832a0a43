#![no_main]
use libfuzzer_sys::fuzz_target;
use parbmp::{DecodeRequest, Limits};

fuzz_target!(|data: &[u8]| {
    // Must never panic, with or without limits
    let _ = parbmp::decode_bmp(data, enough::Unstoppable);

    let limits = Limits {
        max_pixels: Some(1 << 20),
        ..Default::default()
    };
    let _ = DecodeRequest::new()
        .with_limits(&limits)
        .decode(data, enough::Unstoppable);
});
