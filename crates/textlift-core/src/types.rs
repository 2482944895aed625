// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the textlift scan pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Input image formats picked up by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormatKind {
    Png,
    Jpeg,
}

impl ImageFormatKind {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Infer the format from the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type string, for logs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// One image file discovered in the input folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    /// Filename including extension; the item's identity.
    pub name: String,
    /// Filename without its extension, used for the text artifact.
    pub stem: String,
    pub source_path: PathBuf,
    pub format: ImageFormatKind,
}

impl ImageItem {
    /// Build an item from a path, or `None` if it is not a supported image.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let source_path = path.into();
        let format = ImageFormatKind::from_path(&source_path)?;
        let name = source_path.file_name()?.to_str()?.to_owned();
        let stem = source_path.file_stem()?.to_str()?.to_owned();
        Some(Self {
            name,
            stem,
            source_path,
            format,
        })
    }

    /// Name of the text artifact for this item.
    pub fn text_name(&self) -> String {
        format!("{}.txt", self.stem)
    }
}

/// What happened to the text step of a successfully enhanced item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// Non-empty text was written to this path.
    Written(PathBuf),
    /// OCR ran and found nothing; no file was written.
    Empty,
}

/// Result of processing one item during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// An output with the same filename already exists.
    Skipped,
    /// Enhanced image persisted and the text step completed.
    Enhanced {
        output_path: PathBuf,
        text: TextOutcome,
    },
    /// The source could not be decoded; nothing was written.
    DecodeFailure { reason: String },
    /// Enhanced image persisted but OCR failed.
    OcrFailure {
        output_path: PathBuf,
        reason: String,
    },
    /// An output file could not be written.
    WriteFailure { path: PathBuf, reason: String },
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DecodeFailure { .. } | Self::OcrFailure { .. } | Self::WriteFailure { .. }
        )
    }

    /// Short tag for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Enhanced { .. } => "enhanced",
            Self::DecodeFailure { .. } => "decode-failure",
            Self::OcrFailure { .. } => "ocr-failure",
            Self::WriteFailure { .. } => "write-failure",
        }
    }
}

/// Everything one scan did, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub items: Vec<(String, ItemOutcome)>,
    /// The scan stopped early because cancellation was requested.
    pub interrupted: bool,
}

impl ScanReport {
    pub fn outcome(&self, name: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|(item, _)| item == name)
            .map(|(_, outcome)| outcome)
    }

    /// Items whose enhanced image was written this scan.
    pub fn processed(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, o)| matches!(o, ItemOutcome::Enhanced { .. } | ItemOutcome::OcrFailure { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, o)| matches!(o, ItemOutcome::Skipped))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn texts_written(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    ItemOutcome::Enhanced {
                        text: TextOutcome::Written(_),
                        ..
                    }
                )
            })
            .count()
    }
}
