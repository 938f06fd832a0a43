//! BMP decoder for uncompressed 24/32-bit pixel arrays.
//!
//! Reads the file header, the DIB header and then the whole remaining
//! payload as declared by the file size. Pixel rows are expanded from the
//! payload into a 4-channel [`PixelBuffer`]; the payload itself is kept so
//! the encoder can reproduce every byte that is not a pixel.

use std::io::Read;

use enough::Stop;

use super::header::{DibHeader, FILE_HEADER_LEN, FileHeader};
use super::utils::expand_row;
use super::{Geometry, Image};
use crate::error::BitmapError;
use crate::limits::Limits;
use crate::pixel::{BYTES_PER_PIXEL, ColorDepth, PixelBuffer};

pub(crate) fn read_image<R: Read + ?Sized>(
    reader: &mut R,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Image, BitmapError> {
    // ── Headers ─────────────────────────────────────────────────────

    let file_header = FileHeader::read_from(reader)?;
    let dib_header = DibHeader::read_from(reader)?;

    let depth = ColorDepth::from_bits_per_pixel(dib_header.bits_per_pixel).ok_or(
        BitmapError::UnsupportedColorDepth {
            bits_per_pixel: dib_header.bits_per_pixel,
        },
    )?;

    let header_size = FILE_HEADER_LEN + dib_header.header_size as usize;
    let file_size = file_header.file_size as usize;
    if file_size <= header_size {
        return Err(BitmapError::InvalidSizeInfo {
            file_size: file_header.file_size,
            header_size,
        });
    }

    // ── Payload ─────────────────────────────────────────────────────

    let payload_size = file_size - header_size;
    if let Some(limits) = limits {
        limits.check_payload(payload_size)?;
    }
    stop.check()?;
    let payload = read_payload(reader, payload_size)?;

    let first_pixel_index = (file_header.pixel_array_offset as usize)
        .checked_sub(header_size)
        .filter(|&index| index < payload_size)
        .ok_or(BitmapError::InvalidPixelOffset {
            offset: file_header.pixel_array_offset,
            header_size,
            payload_size,
        })?;

    // ── Geometry ────────────────────────────────────────────────────

    let width = dib_header.width.unsigned_abs();
    let height = dib_header.height.unsigned_abs();
    if let Some(limits) = limits {
        limits.check_dimensions(width, height)?;
    }

    let too_large = BitmapError::DimensionsTooLarge { width, height };
    let geometry =
        Geometry::new(depth, width as usize, height as usize).ok_or(too_large)?;

    let available = payload_size - first_pixel_index;
    if geometry.image_size > available {
        return Err(BitmapError::PaddingOverflow {
            image_size: geometry.image_size,
            available,
        });
    }

    if let Some(limits) = limits {
        let decoded = geometry
            .width
            .checked_mul(geometry.height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(BitmapError::DimensionsTooLarge { width, height })?;
        limits.check_buffer(decoded)?;
    }

    // ── Pixels ──────────────────────────────────────────────────────

    let mut pixels = PixelBuffer::new(geometry.width, geometry.height)?;
    let stride = geometry.encoded_stride();
    // Zero-width images have nothing to copy, however many rows they claim.
    let rows = if geometry.row_size == 0 { 0 } else { geometry.height };
    for y in 0..rows {
        if y % 16 == 0 {
            stop.check()?;
        }
        let start = first_pixel_index + y * stride;
        expand_row(
            depth,
            &payload[start..start + geometry.row_size],
            pixels.row_mut(y),
        );
    }
    pixels.clear_slack();

    tracing::debug!(
        width = geometry.width,
        height = geometry.height,
        bits_per_pixel = depth.bits_per_pixel(),
        dib_header_size = dib_header.header_size,
        "decoded bitmap"
    );

    Ok(Image {
        file_header,
        dib_header,
        payload,
        first_pixel_index,
        geometry,
        pixels,
    })
}

/// Read exactly `len` bytes. The allocation grows with the data actually
/// received, so a lying file size cannot force a huge buffer by itself.
fn read_payload<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>, BitmapError> {
    let mut payload = Vec::new();
    payload
        .try_reserve(len.min(1 << 20))
        .map_err(|_| BitmapError::AllocationFailure { bytes: len })?;
    reader
        .take(len as u64)
        .read_to_end(&mut payload)
        .map_err(|e| BitmapError::from_read(e, "pixel data"))?;
    if payload.len() < len {
        return Err(BitmapError::ShortRead { what: "pixel data" });
    }
    Ok(payload)
}
