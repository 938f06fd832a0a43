use crate::error::FilterError;
use crate::pixel::{Bgra8, PixelBuffer};

use super::{MAX_MEDIAN_WINDOW, WindowKernel};

const MAX_AREA: usize = MAX_MEDIAN_WINDOW * MAX_MEDIAN_WINDOW;

/// Per-channel median of a `window × window` neighborhood.
///
/// Out-of-bounds neighbors repeat the nearest edge pixel. B, G and R are
/// filtered independently; alpha comes from the center pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Median {
    window: usize,
}

impl Median {
    /// `window` must be odd and between 3 and [`MAX_MEDIAN_WINDOW`].
    pub fn new(window: usize) -> Result<Self, FilterError> {
        check_window(window)?;
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

pub(crate) fn check_window(window: usize) -> Result<(), FilterError> {
    if window < 3 || window % 2 == 0 || window > MAX_MEDIAN_WINDOW {
        return Err(FilterError::InvalidParameter(format!(
            "median window must be odd and between 3 and {MAX_MEDIAN_WINDOW}, got {window}"
        )));
    }
    Ok(())
}

impl WindowKernel for Median {
    fn apply_row(&self, src: &PixelBuffer, y: usize, out: &mut [Bgra8]) {
        let (width, height) = (src.width(), src.height());
        if width == 0 || height == 0 {
            return;
        }

        let radius = (self.window / 2) as isize;
        let center = src.row_pixels(y);
        let mut blue = [0u8; MAX_AREA];
        let mut green = [0u8; MAX_AREA];
        let mut red = [0u8; MAX_AREA];

        for (x, dst) in out.iter_mut().enumerate().take(width) {
            let mut n = 0;
            for dy in -radius..=radius {
                let row = src.row_pixels(clamp_index(y as isize + dy, height));
                for dx in -radius..=radius {
                    let px = row[clamp_index(x as isize + dx, width)];
                    blue[n] = px.b;
                    green[n] = px.g;
                    red[n] = px.r;
                    n += 1;
                }
            }
            *dst = Bgra8 {
                b: median_of(&mut blue[..n]),
                g: median_of(&mut green[..n]),
                r: median_of(&mut red[..n]),
                a: center[x].a,
            };
        }
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Middle element; for an even count, the mean of the two middle elements
/// rounded down. `values` is reordered. Must not be empty.
pub(crate) fn median_of(values: &mut [u8]) -> u8 {
    let mid = values.len() / 2;
    let odd = values.len() % 2 == 1;
    let (lower, nth, _) = values.select_nth_unstable(mid);
    let nth = *nth;
    if odd {
        return nth;
    }
    let below = lower.iter().copied().max().unwrap_or(nth);
    ((u16::from(below) + u16::from(nth)) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: u8) -> Bgra8 {
        Bgra8 {
            b: v,
            g: v,
            r: v,
            a: 255,
        }
    }

    fn buffer_from(width: usize, height: usize, values: &[u8]) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, gray(values[y * width + x]));
            }
        }
        buf
    }

    fn run(kernel: &Median, src: &PixelBuffer) -> PixelBuffer {
        let mut out = PixelBuffer::new(src.width(), src.height()).unwrap();
        for y in 0..src.height() {
            kernel.apply_row(src, y, out.row_pixels_mut(y));
        }
        out
    }

    #[test]
    fn median_of_odd_and_even() {
        assert_eq!(median_of(&mut [5, 1, 3]), 3);
        assert_eq!(median_of(&mut [9]), 9);
        assert_eq!(median_of(&mut [4, 1, 3, 2]), 2);
        assert_eq!(median_of(&mut [10, 20]), 15);
        assert_eq!(median_of(&mut [255, 254]), 254);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let src = PixelBuffer::filled(5, 4, gray(77)).unwrap();
        for window in [3, 5, 7] {
            assert_eq!(run(&Median::new(window).unwrap(), &src), src);
        }
    }

    #[test]
    fn removes_an_isolated_spike() {
        let mut values = [10u8; 25];
        values[12] = 250;
        let src = buffer_from(5, 5, &values);
        let out = run(&Median::new(3).unwrap(), &src);
        assert_eq!(out.pixel(2, 2), gray(10));
    }

    #[test]
    fn corner_replicates_edges() {
        // At (0, 0) the clamped 3x3 window repeats the top row twice, so the
        // two 100s fill six of the nine slots. At (1, 1) the bottom row does.
        let src = buffer_from(2, 2, &[100, 100, 0, 0]);
        let out = run(&Median::new(3).unwrap(), &src);
        assert_eq!(out.pixel(0, 0), gray(100));
        assert_eq!(out.pixel(1, 0), gray(100));
        assert_eq!(out.pixel(0, 1), gray(0));
        assert_eq!(out.pixel(1, 1), gray(0));
    }

    #[test]
    fn alpha_comes_from_the_center() {
        let mut src = PixelBuffer::filled(3, 3, gray(50)).unwrap();
        src.set_pixel(
            1,
            1,
            Bgra8 {
                b: 50,
                g: 50,
                r: 50,
                a: 7,
            },
        );
        let out = run(&Median::new(3).unwrap(), &src);
        assert_eq!(out.pixel(1, 1).a, 7);
        assert_eq!(out.pixel(0, 0).a, 255);
    }

    #[test]
    fn window_bounds() {
        for window in [0, 1, 2, 4, MAX_MEDIAN_WINDOW + 1, MAX_MEDIAN_WINDOW + 2, usize::MAX] {
            assert!(
                matches!(Median::new(window), Err(FilterError::InvalidParameter(_))),
                "{window}"
            );
        }
        assert_eq!(Median::new(MAX_MEDIAN_WINDOW).unwrap().window(), MAX_MEDIAN_WINDOW);
    }

    #[test]
    fn largest_window_on_a_small_image() {
        let src = buffer_from(3, 2, &[1, 2, 3, 4, 5, 6]);
        let out = run(&Median::new(MAX_MEDIAN_WINDOW).unwrap(), &src);
        // Edge replication weights the nearest pixels; every output is one of the inputs.
        for y in 0..2 {
            for px in out.row_pixels(y) {
                assert!((1..=6).contains(&px.b));
            }
        }
    }

    #[test]
    fn single_pixel_image() {
        let src = buffer_from(1, 1, &[42]);
        assert_eq!(run(&Median::new(5).unwrap(), &src), src);
    }
}
