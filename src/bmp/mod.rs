//! Uncompressed 24/32-bit BMP decoder and encoder.
//!
//! Decoding keeps everything needed to write the file back: both headers
//! (including the DIB bytes this crate does not interpret) and the raw
//! payload. Only the pixel array region of the payload is regenerated on
//! encode, so palettes, masks, row padding and trailing data survive a
//! decode/encode cycle unchanged.

mod decode;
mod encode;
mod header;
mod utils;

use std::io::{Read, Write};

use enough::Stop;

pub use header::{
    DIB_FIXED_LEN, DibHeader, FILE_HEADER_LEN, FileHeader, MAX_DIB_HEADER_LEN, MAX_DIB_TAIL_LEN,
};

use crate::error::BitmapError;
use crate::limits::Limits;
use crate::pixel::{ColorDepth, Orientation, PixelBuffer};

/// Encoded pixel array geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    pub depth: ColorDepth,
    pub width: usize,
    pub height: usize,
    /// Encoded bytes per row, without padding.
    pub row_size: usize,
    pub padding: usize,
    /// `height * (row_size + padding)`.
    pub image_size: usize,
}

impl Geometry {
    /// Returns `None` if any size overflows.
    pub(crate) fn new(depth: ColorDepth, width: usize, height: usize) -> Option<Self> {
        let row_size = width.checked_mul(depth.channels())?;
        let padding = utils::row_padding(depth, width)?;
        let image_size = height.checked_mul(row_size.checked_add(padding)?)?;
        Some(Self {
            depth,
            width,
            height,
            row_size,
            padding,
            image_size,
        })
    }

    pub(crate) fn encoded_stride(&self) -> usize {
        self.row_size + self.padding
    }
}

/// A decoded bitmap: headers, raw payload and the 4-channel pixel buffer.
///
/// Mutate pixels through [`Image::pixels_mut`]; the headers and the
/// geometry are fixed for the lifetime of the image.
#[derive(Clone, Debug)]
pub struct Image {
    file_header: FileHeader,
    dib_header: DibHeader,
    payload: Vec<u8>,
    first_pixel_index: usize,
    geometry: Geometry,
    pixels: PixelBuffer,
}

impl Image {
    /// Wrap a pixel buffer in fresh headers (BITMAPINFOHEADER, top-down rows).
    ///
    /// Row 0 of `pixels` becomes the first stored row. Padding bytes are zero.
    pub fn from_pixels(pixels: PixelBuffer, depth: ColorDepth) -> Result<Self, BitmapError> {
        let too_large = || BitmapError::DimensionsTooLarge {
            width: u32::try_from(pixels.width()).unwrap_or(u32::MAX),
            height: u32::try_from(pixels.height()).unwrap_or(u32::MAX),
        };
        let width = i32::try_from(pixels.width()).map_err(|_| too_large())?;
        let height = i32::try_from(pixels.height()).map_err(|_| too_large())?;
        let geometry =
            Geometry::new(depth, pixels.width(), pixels.height()).ok_or_else(too_large)?;

        let header_size = FILE_HEADER_LEN + 40;
        let image_size = u32::try_from(geometry.image_size).map_err(|_| too_large())?;
        let file_size = u32::try_from(header_size + geometry.image_size).map_err(|_| too_large())?;

        let mut payload = Vec::new();
        payload
            .try_reserve_exact(geometry.image_size)
            .map_err(|_| BitmapError::AllocationFailure {
                bytes: geometry.image_size,
            })?;
        payload.resize(geometry.image_size, 0);

        Ok(Self {
            file_header: FileHeader {
                signature: header::SIGNATURE,
                file_size,
                reserved: 0,
                pixel_array_offset: header_size as u32,
            },
            dib_header: DibHeader::info_header(width, -height, depth, image_size),
            payload,
            first_pixel_index: 0,
            geometry,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Color depth of the encoded file.
    pub fn depth(&self) -> ColorDepth {
        self.geometry.depth
    }

    /// Storage order of the rows. Rows are never reordered by this crate.
    pub fn orientation(&self) -> Orientation {
        self.dib_header.orientation()
    }

    /// Padding bytes at the end of each encoded row.
    pub fn row_padding(&self) -> usize {
        self.geometry.padding
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn dib_header(&self) -> &DibHeader {
        &self.dib_header
    }

    /// Raw bytes following the headers, as read from the file.
    ///
    /// The pixel array region reflects the decoded state, not later edits to
    /// [`Image::pixels_mut`]; encoding regenerates it from the buffer.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Offset of the pixel array inside [`Image::payload`].
    pub fn first_pixel_index(&self) -> usize {
        self.first_pixel_index
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }
}

/// Decode options builder.
///
/// ```no_run
/// use parbmp::{DecodeRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[]; // your BMP bytes
/// let limits = Limits { max_pixels: Some(1 << 24), ..Default::default() };
/// let image = DecodeRequest::new().with_limits(&limits).decode(data, Unstoppable)?;
/// println!("{}x{} {:?}", image.width(), image.height(), image.depth());
/// # Ok::<(), parbmp::BitmapError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeRequest<'a> {
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Decode from an in-memory file. Bytes past the declared file size are ignored.
    pub fn decode(self, data: &[u8], stop: impl Stop) -> Result<Image, BitmapError> {
        let mut reader = data;
        decode::read_image(&mut reader, self.limits, &stop)
    }

    /// Decode from a stream.
    pub fn read<R: Read>(self, reader: &mut R, stop: impl Stop) -> Result<Image, BitmapError> {
        decode::read_image(reader, self.limits, &stop)
    }
}

/// Decode an in-memory BMP file.
pub fn decode_bmp(data: &[u8], stop: impl Stop) -> Result<Image, BitmapError> {
    DecodeRequest::new().decode(data, stop)
}

/// Decode a BMP file from a stream.
pub fn read_bmp<R: Read>(reader: &mut R, stop: impl Stop) -> Result<Image, BitmapError> {
    DecodeRequest::new().read(reader, stop)
}

/// Encode an image to a new byte vector.
pub fn encode_bmp(image: &Image, stop: impl Stop) -> Result<Vec<u8>, BitmapError> {
    let mut out = Vec::new();
    out.try_reserve_exact(image.file_header.file_size as usize)
        .map_err(|_| BitmapError::AllocationFailure {
            bytes: image.file_header.file_size as usize,
        })?;
    encode::write_image(image, &mut out, &stop)?;
    Ok(out)
}

/// Encode an image into a stream.
pub fn write_bmp<W: Write>(image: &Image, writer: &mut W, stop: impl Stop) -> Result<(), BitmapError> {
    encode::write_image(image, writer, &stop)
}
