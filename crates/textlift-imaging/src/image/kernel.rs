// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// 3x3 convolution kernels, applied with `imageproc::filter::filter3x3`.
//
// Border policy: edge replication. A tap that falls outside the image samples
// the nearest edge pixel, so a flat image stays flat under any kernel whose
// weights sum to one.

use image::{DynamicImage, ImageBuffer, Luma, Pixel};
use imageproc::definitions::Image;
use imageproc::filter::filter3x3;
use textlift_core::config::DEFAULT_SHARPEN_KERNEL;

/// A 3x3 convolution kernel, row-major, applied per colour channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3x3 {
    weights: [[f32; 3]; 3],
}

impl Default for Kernel3x3 {
    fn default() -> Self {
        Self::sharpen()
    }
}

impl Kernel3x3 {
    pub const fn new(weights: [[f32; 3]; 3]) -> Self {
        Self { weights }
    }

    /// Centre 5, orthogonal neighbours -1, corners 0.
    pub const fn sharpen() -> Self {
        Self::new(DEFAULT_SHARPEN_KERNEL)
    }

    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }

    /// Convolve every colour channel of `image`.
    ///
    /// The pixel type is preserved. Alpha channels are copied unchanged.
    /// Integer channels are rounded and saturated to their range; float
    /// channels are left unclamped.
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        match image {
            DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(self.filter(buf, to_u8)),
            DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(self.filter(buf, to_u8)),
            DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(self.filter(buf, to_u8)),
            DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(self.filter(buf, to_u8)),
            DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(self.filter(buf, to_u16)),
            DynamicImage::ImageLumaA16(buf) => {
                DynamicImage::ImageLumaA16(self.filter(buf, to_u16))
            }
            DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(self.filter(buf, to_u16)),
            DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(self.filter(buf, to_u16)),
            DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(self.filter(buf, |v| v)),
            DynamicImage::ImageRgba32F(buf) => {
                DynamicImage::ImageRgba32F(self.filter(buf, |v| v))
            }
            other => DynamicImage::ImageRgba8(self.filter(&other.to_rgba8(), to_u8)),
        }
    }

    /// Run `filter3x3` over each colour plane and write the results back.
    ///
    /// Planes are filtered at f32 so `narrow` decides rounding and range.
    fn filter<P>(&self, image: &Image<P>, narrow: impl Fn(f32) -> P::Subpixel) -> Image<P>
    where
        P: Pixel,
        P::Subpixel: Into<f32>,
    {
        let (width, height) = image.dimensions();
        let colour_channels = usize::from(P::CHANNEL_COUNT) - usize::from(P::HAS_ALPHA);
        let mut out = image.clone();

        for channel in 0..colour_channels {
            let plane: Image<Luma<P::Subpixel>> = ImageBuffer::from_fn(width, height, |x, y| {
                Luma([image.get_pixel(x, y).channels()[channel]])
            });
            let filtered = filter3x3::<_, f32, f32>(&plane, self.weights.as_flattened());
            for (pixel, value) in out.pixels_mut().zip(filtered.pixels()) {
                pixel.channels_mut()[channel] = narrow(value.channels()[0]);
            }
        }
        out
    }
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, f32::from(u8::MAX)) as u8
}

fn to_u16(value: f32) -> u16 {
    value.round().clamp(0.0, f32::from(u16::MAX)) as u16
}
