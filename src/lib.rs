//! # parbmp
//!
//! Row-parallel filters for uncompressed BMP images.
//!
//! A bitmap is decoded into a 64-byte aligned BGRA buffer, a filter kernel is
//! applied to every row by a fixed pool of worker threads, and the result is
//! encoded back with the original headers, padding and extra payload bytes.
//!
//! ## Supported input
//!
//! - 24-bit BGR and 32-bit BGRA pixel arrays
//! - Any DIB header variant from 16 to 124 bytes; fields beyond width,
//!   height, planes and bit depth are kept but not interpreted
//! - Bottom-up and top-down row order (rows are never reordered)
//!
//! ## Filters
//!
//! - **brightness-contrast**: `clamp(round(v * contrast + brightness))` per color channel
//! - **sepia**: luminance-weighted sepia tone
//! - **median**: per-channel median over an odd `k × k` window with edge replication
//!
//! Each kernel has a scalar form and, with the `simd` feature, a
//! `wide`-based form selected through [`Strategy`].
//!
//! ## Usage
//!
//! ```no_run
//! use parbmp::{Filter, Processor, ProcessorConfig};
//! use std::path::Path;
//!
//! let processor = Processor::new(ProcessorConfig::default())?;
//! let report = processor.process_file(
//!     Path::new("in.bmp"),
//!     Path::new("out.bmp"),
//!     &Filter::brightness_contrast(20.0, 1.2),
//! )?;
//! println!("{} rows in {:?}", report.rows, report.elapsed);
//! # Ok::<(), parbmp::ProcessError>(())
//! ```
//!
//! Lower-level pieces are public too:
//!
//! ```no_run
//! use parbmp::{DispatchOptions, Filter, Unstoppable, WorkerPool, decode_bmp, dispatch, encode_bmp};
//!
//! let data: &[u8] = &[]; // your BMP bytes
//! let mut image = decode_bmp(data, Unstoppable)?;
//! let pool = WorkerPool::new(4)?;
//! dispatch(&pool, image.pixels_mut(), &Filter::Sepia, &DispatchOptions::default())?;
//! let encoded = encode_bmp(&image, Unstoppable)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod bmp;
pub mod dispatch;
mod error;
pub mod filter;
mod limits;
mod pixel;
pub mod pool;
mod process;
pub mod queue;

pub use bmp::{DecodeRequest, Image, decode_bmp, encode_bmp, read_bmp, write_bmp};
pub use dispatch::{DispatchOptions, DispatchReport, WaitMode, dispatch};
pub use enough::{Stop, Unstoppable};
pub use error::{BitmapError, FilterError, PoolError, ProcessError};
pub use filter::{Filter, Strategy};
pub use limits::Limits;
pub use pixel::{ALIGNMENT, BYTES_PER_PIXEL, Bgra8, ColorDepth, Orientation, PixelBuffer};
pub use pool::WorkerPool;
pub use process::{Processor, ProcessorConfig};
pub use queue::SyncQueue;
