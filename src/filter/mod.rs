//! Pixel filters and the kernel traits the dispatcher runs.
//!
//! A filter is either a *point* kernel, which maps each pixel on its own and
//! can work in place, or a *window* kernel, which reads a neighborhood from an
//! unchanged source buffer and writes a separate destination row.

mod brightness_contrast;
mod median;
mod sepia;

use std::sync::Arc;

pub use brightness_contrast::BrightnessContrast;
pub use median::Median;
pub use sepia::Sepia;

use crate::error::FilterError;
use crate::pixel::{Bgra8, PixelBuffer};

/// Default side length of the median window.
pub const DEFAULT_MEDIAN_WINDOW: usize = 3;

/// Largest accepted median window. Kernels keep their neighborhood on the
/// stack, so the window is bounded.
pub const MAX_MEDIAN_WINDOW: usize = 15;

/// Maps one pixel to one pixel.
pub trait PointKernel: Send + Sync {
    fn apply(&self, px: Bgra8) -> Bgra8;

    fn apply_row(&self, row: &mut [Bgra8]) {
        for px in row {
            *px = self.apply(*px);
        }
    }
}

/// Computes output row `y` from a neighborhood of `src`.
///
/// `out` has exactly `src.width()` pixels.
pub trait WindowKernel: Send + Sync {
    fn apply_row(&self, src: &PixelBuffer, y: usize, out: &mut [Bgra8]);
}

/// A kernel ready to be shared across worker threads.
#[derive(Clone)]
pub enum Kernel {
    Point(Arc<dyn PointKernel>),
    Window(Arc<dyn WindowKernel>),
}

impl Kernel {
    /// Run the kernel over the whole buffer on the calling thread.
    pub fn apply_sequential(&self, buffer: &mut PixelBuffer) -> Result<(), FilterError> {
        match self {
            Kernel::Point(kernel) => {
                for y in 0..buffer.height() {
                    kernel.apply_row(buffer.row_pixels_mut(y));
                }
            }
            Kernel::Window(kernel) => {
                let src = buffer.clone();
                for y in 0..buffer.height() {
                    kernel.apply_row(&src, y, buffer.row_pixels_mut(y));
                }
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Kernel::Point(_) => f.write_str("Kernel::Point"),
            Kernel::Window(_) => f.write_str("Kernel::Window"),
        }
    }
}

/// How kernels compute their per-pixel arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One channel at a time in plain Rust. The reference for every other strategy.
    #[default]
    Scalar,
    /// One pixel per `wide::f32x4` vector. Matches `Scalar` within 1 per channel.
    #[cfg(feature = "simd")]
    Wide,
}

/// The filters available to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    /// `clamp(round(v * contrast + brightness), 0, 255)` on B, G and R.
    BrightnessContrast { brightness: f32, contrast: f32 },
    /// Luminance-weighted sepia tone.
    Sepia,
    /// Per-channel median over a `window × window` neighborhood.
    Median { window: usize },
}

impl Filter {
    pub fn brightness_contrast(brightness: f32, contrast: f32) -> Self {
        Filter::BrightnessContrast {
            brightness,
            contrast,
        }
    }

    /// Median with the default 3×3 window.
    pub fn median() -> Self {
        Filter::Median {
            window: DEFAULT_MEDIAN_WINDOW,
        }
    }

    /// Name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::BrightnessContrast { .. } => "brightness-contrast",
            Filter::Sepia => "sepia",
            Filter::Median { .. } => "median",
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        match *self {
            Filter::BrightnessContrast {
                brightness,
                contrast,
            } => {
                if !brightness.is_finite() || !contrast.is_finite() {
                    return Err(FilterError::InvalidParameter(format!(
                        "brightness ({brightness}) and contrast ({contrast}) must be finite"
                    )));
                }
            }
            Filter::Sepia => {}
            Filter::Median { window } => median::check_window(window)?,
        }
        Ok(())
    }

    /// Build the kernel for this filter. Validates parameters first.
    pub fn kernel(&self, strategy: Strategy) -> Result<Kernel, FilterError> {
        self.validate()?;
        let kernel = match (*self, strategy) {
            (
                Filter::BrightnessContrast {
                    brightness,
                    contrast,
                },
                Strategy::Scalar,
            ) => Kernel::Point(Arc::new(BrightnessContrast::new(brightness, contrast))),
            #[cfg(feature = "simd")]
            (
                Filter::BrightnessContrast {
                    brightness,
                    contrast,
                },
                Strategy::Wide,
            ) => Kernel::Point(Arc::new(brightness_contrast::BrightnessContrastWide::new(
                brightness, contrast,
            ))),
            (Filter::Sepia, Strategy::Scalar) => Kernel::Point(Arc::new(Sepia)),
            #[cfg(feature = "simd")]
            (Filter::Sepia, Strategy::Wide) => Kernel::Point(Arc::new(sepia::SepiaWide::new())),
            // No vector form; the scalar kernel serves every strategy.
            (Filter::Median { window }, _) => Kernel::Window(Arc::new(Median::new(window)?)),
        };
        Ok(kernel)
    }

    /// Apply the filter on the calling thread.
    pub fn apply(&self, buffer: &mut PixelBuffer, strategy: Strategy) -> Result<(), FilterError> {
        self.kernel(strategy)?.apply_sequential(buffer)
    }
}
