//! BMP file header and DIB header (fixed fields plus opaque tail).

use std::io::{Read, Write};

use crate::error::BitmapError;
use crate::pixel::{ColorDepth, Orientation};

/// Length of the BITMAPFILEHEADER.
pub const FILE_HEADER_LEN: usize = 14;

/// Bytes of the DIB header that are parsed: size, width, height, planes, bpp.
pub const DIB_FIXED_LEN: usize = 16;

/// Largest DIB header accepted (BITMAPV5HEADER).
pub const MAX_DIB_HEADER_LEN: usize = 124;

/// Cap on the uninterpreted part of the DIB header.
pub const MAX_DIB_TAIL_LEN: usize = MAX_DIB_HEADER_LEN - DIB_FIXED_LEN;

pub const SIGNATURE: [u8; 2] = *b"BM";

/// The 14-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub reserved: u32,
    pub pixel_array_offset: u32,
}

impl FileHeader {
    pub(crate) fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, BitmapError> {
        let mut raw = [0u8; FILE_HEADER_LEN];
        reader
            .read_exact(&mut raw)
            .map_err(|e| BitmapError::from_read(e, "file header"))?;

        let signature = [raw[0], raw[1]];
        if signature != SIGNATURE {
            return Err(BitmapError::InvalidSignature { found: signature });
        }

        Ok(Self {
            signature,
            file_size: le_u32(&raw[2..6]),
            reserved: le_u32(&raw[6..10]),
            pixel_array_offset: le_u32(&raw[10..14]),
        })
    }

    pub(crate) fn to_bytes(&self) -> [u8; FILE_HEADER_LEN] {
        let mut out = [0u8; FILE_HEADER_LEN];
        out[0..2].copy_from_slice(&self.signature);
        out[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        out[6..10].copy_from_slice(&self.reserved.to_le_bytes());
        out[10..14].copy_from_slice(&self.pixel_array_offset.to_le_bytes());
        out
    }
}

/// The DIB header.
///
/// Only the fields every variant shares are parsed. Whatever the declared
/// size adds beyond them (compression, resolution, masks, color space, ...)
/// is kept as an opaque tail and written back unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct DibHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    tail: [u8; MAX_DIB_TAIL_LEN],
    tail_len: usize,
}

impl DibHeader {
    pub(crate) fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, BitmapError> {
        let mut raw = [0u8; DIB_FIXED_LEN];
        reader
            .read_exact(&mut raw)
            .map_err(|e| BitmapError::from_read(e, "DIB header"))?;

        let header_size = le_u32(&raw[0..4]);
        let tail_len = (header_size as usize)
            .checked_sub(DIB_FIXED_LEN)
            .filter(|&n| n <= MAX_DIB_TAIL_LEN)
            .ok_or(BitmapError::InvalidHeaderVariant {
                declared: header_size,
            })?;

        let mut tail = [0u8; MAX_DIB_TAIL_LEN];
        reader
            .read_exact(&mut tail[..tail_len])
            .map_err(|e| BitmapError::from_read(e, "DIB header"))?;

        Ok(Self {
            header_size,
            width: le_i32(&raw[4..8]),
            height: le_i32(&raw[8..12]),
            planes: le_u16(&raw[12..14]),
            bits_per_pixel: le_u16(&raw[14..16]),
            tail,
            tail_len,
        })
    }

    /// A 40-byte BITMAPINFOHEADER for an uncompressed image.
    pub(crate) fn info_header(width: i32, height: i32, depth: ColorDepth, image_size: u32) -> Self {
        let mut tail = [0u8; MAX_DIB_TAIL_LEN];
        // compression (BI_RGB) stays 0
        tail[4..8].copy_from_slice(&image_size.to_le_bytes());
        tail[8..12].copy_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
        tail[12..16].copy_from_slice(&2835u32.to_le_bytes()); // v resolution
        // colors used, important colors stay 0
        Self {
            header_size: 40,
            width,
            height,
            planes: 1,
            bits_per_pixel: depth.bits_per_pixel(),
            tail,
            tail_len: 40 - DIB_FIXED_LEN,
        }
    }

    /// Bytes of the declared header beyond the parsed fields.
    pub fn tail(&self) -> &[u8] {
        &self.tail[..self.tail_len]
    }

    pub fn orientation(&self) -> Orientation {
        if self.height < 0 {
            Orientation::TopDown
        } else {
            Orientation::BottomUp
        }
    }

    pub(crate) fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), BitmapError> {
        let mut raw = [0u8; MAX_DIB_HEADER_LEN];
        raw[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        raw[4..8].copy_from_slice(&self.width.to_le_bytes());
        raw[8..12].copy_from_slice(&self.height.to_le_bytes());
        raw[12..14].copy_from_slice(&self.planes.to_le_bytes());
        raw[14..16].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        raw[DIB_FIXED_LEN..DIB_FIXED_LEN + self.tail_len].copy_from_slice(self.tail());
        writer
            .write_all(&raw[..DIB_FIXED_LEN + self.tail_len])
            .map_err(|e| BitmapError::from_write(e, "DIB header"))
    }
}

impl core::fmt::Debug for DibHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DibHeader")
            .field("header_size", &self.header_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("planes", &self.planes)
            .field("bits_per_pixel", &self.bits_per_pixel)
            .field("tail_len", &self.tail_len)
            .finish()
    }
}

fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}
