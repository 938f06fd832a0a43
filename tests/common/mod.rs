//! Helpers shared by the integration tests.

#![allow(dead_code)]

/// Deterministic checkerboard of tightly packed pixels with `channels` bytes each.
pub fn checkerboard(w: usize, h: usize, channels: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * channels];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * channels;
            for c in 0..channels {
                pixels[off + c] = if (x + y) % 2 == 0 {
                    200 + (c as u8 * 15)
                } else {
                    10 + (c as u8 * 30)
                };
            }
        }
    }
    pixels
}

/// Xorshift noise, same sequence every run.
pub fn noise_pattern(w: usize, h: usize, channels: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * channels];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

/// Hand-built BMP file.
pub struct BmpBuilder {
    pub width: usize,
    /// Signed: negative means top-down.
    pub height: i32,
    pub bits_per_pixel: u16,
    pub dib_size: u32,
    /// Bytes between the DIB header and the pixel array.
    pub gap: Vec<u8>,
    /// Bytes after the pixel array.
    pub trailer: Vec<u8>,
    pub pad_byte: u8,
    pub reserved: u32,
}

impl BmpBuilder {
    pub fn new(width: usize, height: i32, bits_per_pixel: u16) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
            dib_size: 40,
            gap: Vec::new(),
            trailer: Vec::new(),
            pad_byte: 0,
            reserved: 0,
        }
    }

    pub fn row_size(&self) -> usize {
        self.width * usize::from(self.bits_per_pixel / 8)
    }

    pub fn padding(&self) -> usize {
        (usize::from(self.bits_per_pixel) * self.width).div_ceil(32) * 4 - self.row_size()
    }

    /// `packed` holds the rows in storage order without padding.
    pub fn build(&self, packed: &[u8]) -> Vec<u8> {
        let rows = self.height.unsigned_abs() as usize;
        assert_eq!(packed.len(), rows * self.row_size());

        let offset = 14 + self.dib_size as usize + self.gap.len();
        let image_size = rows * (self.row_size() + self.padding());
        let file_size = offset + image_size + self.trailer.len();

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&self.reserved.to_le_bytes());
        out.extend_from_slice(&(offset as u32).to_le_bytes());

        out.extend_from_slice(&self.dib_size.to_le_bytes());
        out.extend_from_slice(&(self.width as i32).to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&self.bits_per_pixel.to_le_bytes());
        for i in 16..self.dib_size as usize {
            out.push((i as u8) ^ 0x5A);
        }

        out.extend_from_slice(&self.gap);
        if self.row_size() > 0 {
            for row in packed.chunks_exact(self.row_size()) {
                out.extend_from_slice(row);
                out.extend(std::iter::repeat_n(self.pad_byte, self.padding()));
            }
        } else {
            out.extend(std::iter::repeat_n(self.pad_byte, rows * self.padding()));
        }
        out.extend_from_slice(&self.trailer);
        assert_eq!(out.len(), file_size);
        out
    }
}

/// Expand packed 3- or 4-byte pixels to BGRA the way the decoder does.
pub fn to_bgra(packed: &[u8], channels: usize) -> Vec<u8> {
    match channels {
        4 => packed.to_vec(),
        3 => packed
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        _ => panic!("unsupported channel count {channels}"),
    }
}

/// Lets `checks` calls through, then reports cancellation on every later call.
pub struct CancelAfter {
    left: std::sync::atomic::AtomicUsize,
}

impl CancelAfter {
    pub fn new(checks: usize) -> Self {
        Self {
            left: std::sync::atomic::AtomicUsize::new(checks),
        }
    }
}

impl enough::Stop for CancelAfter {
    fn check(&self) -> Result<(), enough::StopReason> {
        use std::sync::atomic::Ordering;
        self.left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| enough::StopReason::Cancelled)
    }
}
