use std::io;
use std::path::PathBuf;

use enough::StopReason;

/// Errors from BMP decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitmapError {
    #[error("invalid file signature {found:02x?}, expected \"BM\"")]
    InvalidSignature { found: [u8; 2] },

    #[error("unsupported color depth: {bits_per_pixel} bits per pixel (only 24 and 32 are supported)")]
    UnsupportedColorDepth { bits_per_pixel: u16 },

    #[error("unsupported DIB header variant: declared size {declared} bytes")]
    InvalidHeaderVariant { declared: u32 },

    #[error("invalid size information: file size {file_size} does not exceed header size {header_size}")]
    InvalidSizeInfo { file_size: u32, header_size: usize },

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },

    #[error("unexpected end of input while reading the {what}")]
    ShortRead { what: &'static str },

    #[error("short write while writing the {what}")]
    ShortWrite { what: &'static str },

    #[error(
        "invalid pixel array offset {offset}: headers end at {header_size}, payload holds {payload_size} bytes"
    )]
    InvalidPixelOffset {
        offset: u32,
        header_size: usize,
        payload_size: usize,
    },

    #[error("pixel array needs {image_size} bytes but only {available} remain in the payload")]
    PaddingOverflow { image_size: usize, available: usize },

    #[error("buffer size mismatch: need {needed} bytes, got {actual}")]
    BufferSizeMismatch { needed: usize, actual: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for BitmapError {
    fn from(r: StopReason) -> Self {
        BitmapError::Cancelled(r)
    }
}

impl BitmapError {
    /// Map a failed `read_exact` onto `ShortRead` when the input ran out.
    pub(crate) fn from_read(err: io::Error, what: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            BitmapError::ShortRead { what }
        } else {
            BitmapError::Io(err)
        }
    }

    /// Map a failed `write_all` onto `ShortWrite` when the sink stopped accepting bytes.
    pub(crate) fn from_write(err: io::Error, what: &'static str) -> Self {
        if err.kind() == io::ErrorKind::WriteZero {
            BitmapError::ShortWrite { what }
        } else {
            BitmapError::Io(err)
        }
    }
}

/// Errors from the worker pool and its task queue.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    #[error("failed to spawn worker thread {index}")]
    ThreadCreationFailure {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("synchronization primitive failure: {0}")]
    SynchronizationPrimitiveFailure(&'static str),

    #[error("worker pool size must be at least 1")]
    InvalidSize,

    #[error("worker pool has been shut down")]
    ShutDown,
}

/// Errors from applying a filter across an image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FilterError {
    #[error("invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("{failed_rows} of {total_rows} rows were not processed")]
    TaskFailed { failed_rows: usize, total_rows: usize },
}

/// Errors from the file-to-file processing pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessError {
    #[error("failed to open the source image '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create the image '{}'", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error processing the image '{}'", .path.display())]
    Bitmap {
        path: PathBuf,
        #[source]
        source: BitmapError,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}
