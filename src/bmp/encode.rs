//! BMP encoder: writes an [`Image`] back in its original layout.

use std::io::Write;

use enough::Stop;

use super::Image;
use super::utils::contract_row;
use crate::error::BitmapError;
use crate::pixel::BYTES_PER_PIXEL;

/// Write headers, the bytes before the pixel array, the regenerated pixel
/// rows (each followed by its original padding bytes) and whatever the
/// payload held after the pixel array.
pub(crate) fn write_image<W: Write + ?Sized>(
    image: &Image,
    writer: &mut W,
    stop: &dyn Stop,
) -> Result<(), BitmapError> {
    let geometry = image.geometry;
    let start = image.first_pixel_index;
    let end = start + geometry.image_size;
    let stride = geometry.encoded_stride();

    let buffer = &image.pixels;
    if (buffer.width(), buffer.height()) != (geometry.width, geometry.height) {
        return Err(BitmapError::BufferSizeMismatch {
            needed: geometry.width * geometry.height * BYTES_PER_PIXEL,
            actual: buffer.as_bytes().len(),
        });
    }

    writer
        .write_all(&image.file_header.to_bytes())
        .map_err(|e| BitmapError::from_write(e, "file header"))?;
    image.dib_header.write_to(writer)?;
    writer
        .write_all(&image.payload[..start])
        .map_err(|e| BitmapError::from_write(e, "payload"))?;

    stop.check()?;

    let mut row = vec![0u8; stride];
    let rows = if stride == 0 { 0 } else { geometry.height };
    for y in 0..rows {
        if y % 16 == 0 {
            stop.check()?;
        }
        let src = start + y * stride;
        let (pixels, padding) = row.split_at_mut(geometry.row_size);
        contract_row(geometry.depth, buffer.row(y), pixels);
        padding.copy_from_slice(&image.payload[src + geometry.row_size..src + stride]);
        writer
            .write_all(&row)
            .map_err(|e| BitmapError::from_write(e, "pixel data"))?;
    }

    writer
        .write_all(&image.payload[end..])
        .map_err(|e| BitmapError::from_write(e, "payload"))?;
    writer.flush()?;

    tracing::debug!(
        width = geometry.width,
        height = geometry.height,
        bytes = image.file_header.file_size,
        "encoded bitmap"
    );
    Ok(())
}
