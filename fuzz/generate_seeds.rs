#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn bmp(width: i32, height: i32, bpp: u16, dib_size: u32, pixels: &[u8]) -> Vec<u8> {
    let offset = 14 + dib_size;
    let file_size = offset + pixels.len() as u32;
    let mut out = vec![0u8; offset as usize];
    out[0] = b'B';
    out[1] = b'M';
    out[2..6].copy_from_slice(&file_size.to_le_bytes());
    out[10..14].copy_from_slice(&offset.to_le_bytes());
    out[14..18].copy_from_slice(&dib_size.to_le_bytes());
    out[18..22].copy_from_slice(&width.to_le_bytes());
    out[22..26].copy_from_slice(&height.to_le_bytes());
    out[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    out[28..30].copy_from_slice(&bpp.to_le_bytes());
    out[34..38].copy_from_slice(&(pixels.len() as u32).to_le_bytes());
    out.extend_from_slice(pixels);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // 1x1 24-bit, bottom-up (3 bytes + 1 padding)
    fs::write(format!("{dir}/bgr_1x1.bmp"), bmp(1, 1, 24, 40, &[0xff, 0, 0, 0])).unwrap();

    // 2x2 24-bit, top-down
    let rows = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0, 0, 0x70, 0x80, 0x90, 0xa0, 0xb0, 0xc0, 0, 0];
    fs::write(format!("{dir}/bgr_2x2_topdown.bmp"), bmp(2, -2, 24, 40, &rows)).unwrap();

    // 2x1 32-bit with alpha
    let px = [1, 2, 3, 0x80, 4, 5, 6, 0xff];
    fs::write(format!("{dir}/bgra_2x1.bmp"), bmp(2, 1, 32, 40, &px)).unwrap();

    // V5 header
    fs::write(format!("{dir}/bgra_1x1_v5.bmp"), bmp(1, 1, 32, 124, &[9, 8, 7, 6])).unwrap();

    // Unsupported depth and zero width
    fs::write(format!("{dir}/rgb16_1x1.bmp"), bmp(1, 1, 16, 40, &[0, 0, 0, 0])).unwrap();
    fs::write(format!("{dir}/zero_width.bmp"), bmp(0, 4, 24, 40, &[])).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    let mut cut = bmp(4, 4, 24, 40, &[0x33; 48]);
    cut.truncate(70);
    fs::write(format!("{dir}/truncated_pixels.bmp"), cut).unwrap();

    println!("Generated seed corpus in {dir}/");
}
