// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement and optical character recognition (OCR).

pub mod enhance;
pub mod extract;
pub mod tesseract;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use enhance::Enhancer;
pub use extract::{TextExtractor, TextRecognizer};
pub use tesseract::TesseractCli;

#[cfg(feature = "ocr")]
pub use ocr::OcrsRecognizer;
