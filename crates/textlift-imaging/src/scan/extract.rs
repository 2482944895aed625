// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction — grayscale conversion in front of a pluggable OCR engine.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use textlift_core::config::OcrBackend;
use textlift_core::error::TextliftError;
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;
use crate::scan::tesseract::TesseractCli;

/// An OCR engine: grayscale raster in, raw text out.
///
/// Implementations report engine problems (missing executable, bad model,
/// crash) as errors. "No text found" is an empty `Ok`, never an error.
pub trait TextRecognizer: Send {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, image: &GrayImage) -> Result<String, TextliftError>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, TextliftError> {
        (**self).recognize(image)
    }
}

/// Build the recognizer selected in the configuration.
///
/// # Errors
///
/// Returns [`TextliftError::OcrUnavailable`] when the `ocrs` engine is
/// requested but this build lacks the `ocr` feature, or its models are missing.
pub fn recognizer_from_config(
    backend: &OcrBackend,
) -> Result<Box<dyn TextRecognizer>, TextliftError> {
    match backend {
        OcrBackend::Tesseract { command, language } => {
            let mut tesseract = TesseractCli::new(command);
            if let Some(language) = language {
                tesseract = tesseract.with_language(language);
            }
            Ok(Box::new(tesseract))
        }
        #[cfg(feature = "ocr")]
        OcrBackend::Ocrs { model_dir } => {
            let config = match model_dir {
                Some(dir) => crate::scan::ocr::ModelPaths::in_dir(dir),
                None => crate::scan::ocr::ModelPaths::default(),
            };
            Ok(Box::new(crate::scan::ocr::OcrsRecognizer::new(config)?))
        }
        #[cfg(not(feature = "ocr"))]
        OcrBackend::Ocrs { .. } => Err(TextliftError::OcrUnavailable(
            "the ocrs engine needs a build with the `ocr` feature".into(),
        )),
    }
}

/// Runs OCR over enhanced images and normalises the result.
pub struct TextExtractor<R> {
    recognizer: R,
}

impl<R: TextRecognizer> TextExtractor<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Extract trimmed text from a decoded image. Colour is discarded first.
    ///
    /// An empty string means the engine found no text.
    #[instrument(skip_all, fields(engine = self.recognizer.name(), width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &DynamicImage) -> Result<String, TextliftError> {
        let gray = image.to_luma8();
        let raw = self.recognizer.recognize(&gray)?;
        let text = raw.trim().to_owned();
        debug!(chars = text.chars().count(), lines = text.lines().count(), "OCR finished");
        Ok(text)
    }

    /// Decode the image at `path` and extract its text.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<String, TextliftError> {
        let image = ImageProcessor::open(path)?.into_dynamic();
        self.extract(&image)
    }
}
