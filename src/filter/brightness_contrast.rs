use crate::pixel::Bgra8;

use super::PointKernel;

/// `clamp(round(v * contrast + brightness), 0, 255)` on B, G and R. Alpha is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrightnessContrast {
    brightness: f32,
    contrast: f32,
}

impl BrightnessContrast {
    pub fn new(brightness: f32, contrast: f32) -> Self {
        Self {
            brightness,
            contrast,
        }
    }

    #[inline]
    fn channel(&self, v: u8) -> u8 {
        (f32::from(v) * self.contrast + self.brightness)
            .round()
            .clamp(0.0, 255.0) as u8
    }
}

impl PointKernel for BrightnessContrast {
    #[inline]
    fn apply(&self, px: Bgra8) -> Bgra8 {
        Bgra8 {
            b: self.channel(px.b),
            g: self.channel(px.g),
            r: self.channel(px.r),
            a: px.a,
        }
    }
}

#[cfg(feature = "simd")]
pub(crate) use wide_impl::BrightnessContrastWide;

#[cfg(feature = "simd")]
mod wide_impl {
    use wide::f32x4;

    use super::super::PointKernel;
    use crate::pixel::Bgra8;

    /// [`super::BrightnessContrast`] with the pixel's four channels in one vector.
    pub(crate) struct BrightnessContrastWide {
        contrast: f32x4,
        brightness: f32x4,
    }

    impl BrightnessContrastWide {
        pub(crate) fn new(brightness: f32, contrast: f32) -> Self {
            Self {
                contrast: f32x4::from(contrast),
                brightness: f32x4::from(brightness),
            }
        }
    }

    impl PointKernel for BrightnessContrastWide {
        #[inline]
        fn apply(&self, px: Bgra8) -> Bgra8 {
            let v = f32x4::from([
                f32::from(px.b),
                f32::from(px.g),
                f32::from(px.r),
                f32::from(px.a),
            ]);
            let out = (v * self.contrast + self.brightness)
                .round()
                .max(f32x4::from(0.0))
                .min(f32x4::from(255.0));
            let [b, g, r, _] = out.to_array();
            Bgra8 {
                b: b as u8,
                g: g as u8,
                r: r as u8,
                a: px.a,
            }
        }
    }
}
