use crate::pixel::Bgra8;

use super::PointKernel;

// Rows give the output channel, columns the input R, G, B weights.
const RED: [f32; 3] = [0.393, 0.769, 0.189];
const GREEN: [f32; 3] = [0.349, 0.686, 0.168];
const BLUE: [f32; 3] = [0.272, 0.534, 0.131];

/// Sepia tone. Each output channel is a weighted sum of R, G and B,
/// rounded and capped at 255. Alpha is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sepia;

#[inline]
fn weigh(weights: [f32; 3], r: f32, g: f32, b: f32) -> u8 {
    (weights[0] * r + weights[1] * g + weights[2] * b)
        .round()
        .min(255.0) as u8
}

impl PointKernel for Sepia {
    #[inline]
    fn apply(&self, px: Bgra8) -> Bgra8 {
        let (r, g, b) = (f32::from(px.r), f32::from(px.g), f32::from(px.b));
        Bgra8 {
            b: weigh(BLUE, r, g, b),
            g: weigh(GREEN, r, g, b),
            r: weigh(RED, r, g, b),
            a: px.a,
        }
    }
}

#[cfg(feature = "simd")]
pub(crate) use wide_impl::SepiaWide;

#[cfg(feature = "simd")]
mod wide_impl {
    use wide::f32x4;

    use super::{BLUE, GREEN, RED};
    use crate::filter::PointKernel;
    use crate::pixel::Bgra8;

    /// [`super::Sepia`] as three multiply-adds over `[b', g', r', _]` lanes.
    pub(crate) struct SepiaWide {
        from_r: f32x4,
        from_g: f32x4,
        from_b: f32x4,
    }

    impl SepiaWide {
        pub(crate) fn new() -> Self {
            let column = |i: usize| f32x4::from([BLUE[i], GREEN[i], RED[i], 0.0]);
            Self {
                from_r: column(0),
                from_g: column(1),
                from_b: column(2),
            }
        }
    }

    impl PointKernel for SepiaWide {
        #[inline]
        fn apply(&self, px: Bgra8) -> Bgra8 {
            let out = self.from_r * f32x4::from(f32::from(px.r))
                + self.from_g * f32x4::from(f32::from(px.g))
                + self.from_b * f32x4::from(f32::from(px.b));
            let [b, g, r, _] = out.round().min(f32x4::from(255.0)).to_array();
            Bgra8 {
                b: b as u8,
                g: g as u8,
                r: r as u8,
                a: px.a,
            }
        }
    }
}
