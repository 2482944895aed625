// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upscale + sharpen enhancement for making small or blurry text legible.

use std::path::Path;

use image::DynamicImage;
use textlift_core::PipelineConfig;
use textlift_core::error::TextliftError;
use tracing::{debug, instrument};

use crate::image::kernel::Kernel3x3;
use crate::image::processor::ImageProcessor;

/// Deterministic upscale-then-sharpen transform.
///
/// The resize uses Catmull-Rom cubic interpolation; the sharpen step is a
/// 3x3 convolution with edge-replicated borders. Nothing is cached between
/// the two steps and the transform has no side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancer {
    scale_factor: f32,
    kernel: Kernel3x3,
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new(2.0, Kernel3x3::sharpen())
    }
}

impl Enhancer {
    pub fn new(scale_factor: f32, kernel: Kernel3x3) -> Self {
        Self {
            scale_factor,
            kernel,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.scale_factor, Kernel3x3::new(config.sharpen_kernel))
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Output size for a `width` x `height` source: each side multiplied by
    /// the scale factor and rounded, never collapsing a non-empty side to 0.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (self.scale(width), self.scale(height))
    }

    fn scale(&self, side: u32) -> u32 {
        if side == 0 {
            return 0;
        }
        (f64::from(side) * f64::from(self.scale_factor))
            .round()
            .clamp(1.0, f64::from(u32::MAX)) as u32
    }

    /// Enhance an already-decoded image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), scale = self.scale_factor))]
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = self.target_dimensions(image.width(), image.height());
        if image.width() == 0 || image.height() == 0 {
            return image.clone();
        }

        let enhanced = ImageProcessor::from_dynamic(image.clone())
            .resize_exact(width, height)
            .sharpen(&self.kernel)
            .into_dynamic();

        debug!(
            new_w = enhanced.width(),
            new_h = enhanced.height(),
            "Enhancement complete"
        );
        enhanced
    }

    /// Decode `path` and enhance it.
    ///
    /// # Errors
    ///
    /// Returns [`TextliftError::Decode`] if the file is missing, corrupt or in
    /// an unsupported encoding.
    pub fn enhance_file(&self, path: impl AsRef<Path>) -> Result<DynamicImage, TextliftError> {
        let source = ImageProcessor::open(path)?;
        Ok(self.enhance(source.as_dynamic()))
    }
}
