//! Row conversion between the encoded pixel array and the 4-channel buffer.

use crate::pixel::ColorDepth;

/// Convert one encoded row (no padding) into BGRA.
///
/// 24-bit pixels advance 3 bytes in `src` and get an opaque alpha; 32-bit
/// rows are copied as-is.
pub(crate) fn expand_row(depth: ColorDepth, src: &[u8], dst: &mut [u8]) {
    match depth {
        ColorDepth::Bgra32 => dst.copy_from_slice(src),
        ColorDepth::Bgr24 => {
            for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
                d[..3].copy_from_slice(s);
                d[3] = 0xFF;
            }
        }
    }
}

/// Convert one BGRA row back to its encoded form (no padding).
pub(crate) fn contract_row(depth: ColorDepth, src: &[u8], dst: &mut [u8]) {
    match depth {
        ColorDepth::Bgra32 => dst.copy_from_slice(src),
        ColorDepth::Bgr24 => {
            for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
                d.copy_from_slice(&s[..3]);
            }
        }
    }
}

/// Bytes appended to each encoded row so its length is a multiple of 4.
pub(crate) fn row_padding(depth: ColorDepth, width: usize) -> Option<usize> {
    let bits = width.checked_mul(usize::from(depth.bits_per_pixel()))?;
    let padded = bits.div_ceil(32).checked_mul(4)?;
    Some(padded - width * depth.channels())
}
