// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textlift-imaging — Image enhancement and text extraction for textlift.
//
// Provides in-memory image operations (decode, cubic resize, 3x3 convolution,
// grayscale, encode), the upscale+sharpen enhancer, and OCR text extraction
// through a pluggable recognizer (tesseract CLI, or `ocrs` behind a feature).

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `textlift_imaging::Enhancer` etc.
pub use self::image::kernel::Kernel3x3;
pub use self::image::processor::ImageProcessor;
pub use scan::enhance::Enhancer;
pub use scan::extract::{TextExtractor, TextRecognizer, recognizer_from_config};
pub use scan::tesseract::TesseractCli;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsRecognizer;
