#![no_main]
use libfuzzer_sys::fuzz_target;
use parbmp::*;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode and decode to the same pixels
    let Ok(decoded) = decode_bmp(data, enough::Unstoppable) else {
        return;
    };
    let Ok(reencoded) = encode_bmp(&decoded, enough::Unstoppable) else {
        return;
    };
    let Ok(decoded2) = decode_bmp(&reencoded, enough::Unstoppable) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.pixels(), decoded2.pixels(), "roundtrip pixel mismatch");
    assert_eq!(decoded.depth(), decoded2.depth());
    assert_eq!(decoded.orientation(), decoded2.orientation());

    // Encoding is a fixed point after the first pass
    let again = encode_bmp(&decoded2, enough::Unstoppable).expect("second encode");
    assert_eq!(again, reencoded);
});
