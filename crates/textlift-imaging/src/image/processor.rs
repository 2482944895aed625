// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, exact resize, sharpening convolution and
// encoding. Operates on in-memory images using the `image` crate.

use std::io::{Seek, Write};
use std::path::Path;

use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use textlift_core::error::TextliftError;
use tracing::{debug, info, instrument};

use crate::image::kernel::Kernel3x3;

/// One decoded image moving through resize and sharpen.
///
/// Transformations take `self` by value and hand back the result, so steps chain.
///
/// ```ignore
/// let enhanced = ImageProcessor::open("in/receipt.png")?
///     .resize_exact(1600, 1200)
///     .sharpen(&Kernel3x3::sharpen())
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image from a file path.
    ///
    /// The decoder is picked from the file's leading bytes, falling back to
    /// the extension, so a PNG saved as `.jpg` still opens. Missing files,
    /// corrupt data and unsupported encodings all surface as
    /// [`TextliftError::Decode`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextliftError> {
        let path = path.as_ref();
        let decode_error = |reason: String| TextliftError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        let img = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| decode_error(err.to_string()))?
            .decode()
            .map_err(|err| decode_error(err.to_string()))?;
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image decoded"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize to exactly `width` x `height` with Catmull-Rom (bicubic)
    /// filtering. Pixel type and channel count are unchanged.
    #[instrument(skip(self), fields(width, height))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Resizing image"
        );
        Self {
            image: self
                .image
                .resize_exact(width, height, FilterType::CatmullRom),
        }
    }

    /// Convolve the colour channels with a 3x3 kernel (edge-replicated borders).
    #[instrument(skip_all)]
    pub fn sharpen(self, kernel: &Kernel3x3) -> Self {
        debug!(weights = ?kernel.weights(), "Applying 3x3 convolution");
        Self {
            image: kernel.apply(&self.image),
        }
    }
}

/// Encode `image` into `writer`.
///
/// JPEG cannot carry alpha or more than 8 bits per channel, so such images
/// are flattened to 8-bit luma or RGB first.
pub fn encode_into<W: Write + Seek>(
    image: &DynamicImage,
    writer: &mut W,
    format: ImageFormat,
) -> Result<(), String> {
    let encodable = encodable_for(image, format);
    encodable
        .as_ref()
        .unwrap_or(image)
        .write_to(writer, format)
        .map_err(|err| err.to_string())
}

/// A converted copy of `image` when `format` cannot encode it as-is.
fn encodable_for(image: &DynamicImage, format: ImageFormat) -> Option<DynamicImage> {
    if format != ImageFormat::Jpeg {
        return None;
    }
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => None,
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            Some(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}
