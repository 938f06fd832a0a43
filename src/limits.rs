use crate::error::BitmapError;

/// Decode caps, checked before the corresponding allocation is made.
///
/// Decoding allocates twice: the payload (every byte after the headers, as
/// sized by the file header) and the 4-byte-per-pixel buffer. A file can
/// declare a large payload around a tiny pixel array, so the two have
/// separate caps. `None` leaves a dimension unbounded; the default has no
/// caps at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// `width × height`.
    pub max_pixels: Option<u64>,
    /// Bytes read after the headers, including gaps and trailing data.
    pub max_payload_bytes: Option<usize>,
    /// Bytes of the decoded pixel buffer, `width × height × 4`.
    pub max_buffer_bytes: Option<usize>,
}

fn within<T: PartialOrd + core::fmt::Display>(
    what: &str,
    value: T,
    cap: Option<T>,
) -> Result<(), BitmapError> {
    match cap {
        Some(cap) if value > cap => Err(BitmapError::LimitExceeded(format!(
            "{what} {value} is over the limit of {cap}"
        ))),
        _ => Ok(()),
    }
}

impl Limits {
    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<(), BitmapError> {
        within("width", width, self.max_width)?;
        within("height", height, self.max_height)?;
        within(
            "pixel count",
            u64::from(width) * u64::from(height),
            self.max_pixels,
        )
    }

    pub(crate) fn check_payload(&self, bytes: usize) -> Result<(), BitmapError> {
        within("payload size", bytes, self.max_payload_bytes)
    }

    pub(crate) fn check_buffer(&self, bytes: usize) -> Result<(), BitmapError> {
        within("pixel buffer size", bytes, self.max_buffer_bytes)
    }
}
