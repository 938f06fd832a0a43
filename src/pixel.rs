use core::fmt;

use bytemuck::{Pod, Zeroable};
use rgb::AsPixels as _;

use crate::error::BitmapError;

/// One decoded pixel, stored as B, G, R, A bytes.
pub type Bgra8 = rgb::alt::BGRA<u8>;

/// Alignment of the pixel buffer storage, and the size of its trailing slack.
pub const ALIGNMENT: usize = 64;

/// Bytes per pixel inside a [`PixelBuffer`]. Always 4, whatever the source depth.
pub const BYTES_PER_PIXEL: usize = 4;

/// Color depth of the encoded pixel array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    /// 3 bytes per pixel, B,G,R. Alpha is synthesized as 255 on decode.
    Bgr24,
    /// 4 bytes per pixel, B,G,R,A.
    Bgra32,
}

impl ColorDepth {
    pub fn from_bits_per_pixel(bpp: u16) -> Option<Self> {
        match bpp {
            24 => Some(Self::Bgr24),
            32 => Some(Self::Bgra32),
            _ => None,
        }
    }

    pub fn bits_per_pixel(&self) -> u16 {
        match self {
            Self::Bgr24 => 24,
            Self::Bgra32 => 32,
        }
    }

    /// Number of channels (and bytes) per encoded pixel.
    pub fn channels(&self) -> usize {
        match self {
            Self::Bgr24 => 3,
            Self::Bgra32 => 4,
        }
    }
}

/// Vertical storage order of the encoded rows, taken from the sign of the height field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Positive height: first stored row is the bottom of the picture.
    BottomUp,
    /// Negative height: first stored row is the top of the picture.
    TopDown,
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(64))]
struct Block([u8; ALIGNMENT]);

/// Decoded pixels in a fixed 4-channel layout.
///
/// Rows are `stride` bytes apart and hold `width` BGRA pixels. Rows keep the
/// order they had in the file; nothing is flipped. Storage starts on a
/// 64-byte boundary and is followed by at least [`ALIGNMENT`] zeroed bytes
/// of slack, so a wide load starting anywhere inside the last row stays in
/// bounds.
#[derive(Clone)]
pub struct PixelBuffer {
    blocks: Vec<Block>,
    width: usize,
    height: usize,
    stride: usize,
    len: usize,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(width: usize, height: usize) -> Result<Self, BitmapError> {
        let too_large = || BitmapError::DimensionsTooLarge {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        };
        let stride = width.checked_mul(BYTES_PER_PIXEL).ok_or_else(too_large)?;
        let len = stride.checked_mul(height).ok_or_else(too_large)?;
        let total = len.checked_add(ALIGNMENT).ok_or_else(too_large)?;
        let block_count = total.div_ceil(ALIGNMENT);

        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(block_count)
            .map_err(|_| BitmapError::AllocationFailure {
                bytes: block_count * ALIGNMENT,
            })?;
        blocks.resize(block_count, Block::zeroed());

        Ok(Self {
            blocks,
            width,
            height,
            stride,
            len,
        })
    }

    /// Build a buffer from tightly packed BGRA bytes.
    pub fn from_bgra(width: usize, height: usize, bgra: &[u8]) -> Result<Self, BitmapError> {
        let mut buf = Self::new(width, height)?;
        if bgra.len() != buf.len {
            return Err(BitmapError::BufferSizeMismatch {
                needed: buf.len,
                actual: bgra.len(),
            });
        }
        buf.as_bytes_mut().copy_from_slice(bgra);
        Ok(buf)
    }

    /// Build a buffer where every pixel is `px`.
    pub fn filled(width: usize, height: usize, px: Bgra8) -> Result<Self, BitmapError> {
        let mut buf = Self::new(width, height)?;
        for y in 0..height {
            buf.row_pixels_mut(y).fill(px);
        }
        Ok(buf)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes from the start of one row to the start of the next.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes, excluding the trailing slack.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage()[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..len]
    }

    /// Whole allocation: pixel bytes followed by the zeroed slack.
    pub fn storage(&self) -> &[u8] {
        bytemuck::cast_slice::<Block, u8>(&self.blocks)
    }

    /// Zero everything past the last row.
    pub(crate) fn clear_slack(&mut self) {
        let len = self.len;
        bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[len..].fill(0);
    }

    pub(crate) fn base_ptr_mut(&mut self) -> *mut u8 {
        bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks).as_mut_ptr()
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.as_bytes()[start..start + self.stride]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let stride = self.stride;
        &mut self.as_bytes_mut()[start..start + stride]
    }

    pub fn row_pixels(&self, y: usize) -> &[Bgra8] {
        self.row(y)[..self.width * BYTES_PER_PIXEL].as_pixels()
    }

    pub fn row_pixels_mut(&mut self, y: usize) -> &mut [Bgra8] {
        let row_len = self.width * BYTES_PER_PIXEL;
        self.row_mut(y)[..row_len].as_pixels_mut()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Bgra8 {
        self.row_pixels(y)[x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, px: Bgra8) {
        self.row_pixels_mut(y)[x] = px;
    }

    /// Read a pixel with both coordinates clamped into the image (edge replication).
    ///
    /// The buffer must not be empty.
    pub fn sample_clamped(&self, x: isize, y: isize) -> Bgra8 {
        debug_assert!(self.width > 0 && self.height > 0);
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.pixel(cx, cy)
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}
