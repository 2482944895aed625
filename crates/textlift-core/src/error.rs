// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for textlift.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all textlift operations.
#[derive(Debug, Error)]
pub enum TextliftError {
    // -- Image errors --
    #[error("image not found or unreadable: {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    // -- OCR errors --
    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    // -- Storage --
    #[error("cannot create folder {path}: {source}")]
    StorageSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TextliftError {
    /// Whether this error ends the process rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StorageSetup { .. } | Self::InvalidConfig(_) | Self::Serialization(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TextliftError>;
