// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the console.
//
// Every technical error is mapped to a plain sentence plus a suggestion, so
// an investigator watching the console knows whether to fix something or wait.

use crate::error::TextliftError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Likely to succeed on the next scan without intervention.
    Transient,
    /// The operator must do something (install tesseract, fix permissions).
    ActionRequired,
    /// Retrying the same input will fail the same way.
    Permanent,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `TextliftError` into a `HumanError`.
pub fn humanize_error(err: &TextliftError) -> HumanError {
    match err {
        TextliftError::Decode { path, .. } => HumanError {
            message: format!("Image not found or could not be read: {}", path.display()),
            suggestion: "The file may be corrupt or not really a PNG/JPEG. Re-export it and drop it in again.".into(),
            severity: Severity::Permanent,
        },

        TextliftError::Encode { path, .. } => HumanError {
            message: format!("The enhanced image could not be encoded: {}", path.display()),
            suggestion: "Try converting the source to PNG.".into(),
            severity: Severity::Permanent,
        },

        TextliftError::Ocr(detail) => humanize_ocr_error(detail),

        TextliftError::OcrUnavailable(detail) => HumanError {
            message: "The text recognition engine is not available.".into(),
            suggestion: format!("Install it or point the configuration at it. ({detail})"),
            severity: Severity::ActionRequired,
        },

        TextliftError::StorageSetup { path, .. } => HumanError {
            message: format!("Cannot create the folder {}.", path.display()),
            suggestion: "Check that the working directory is writable.".into(),
            severity: Severity::ActionRequired,
        },

        TextliftError::Write { path, source } => {
            if source.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: format!("No permission to write {}.", path.display()),
                    suggestion: "Check the output folder permissions.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: format!("Could not write {}.", path.display()),
                    suggestion: "The disk may be full. The item will be retried on the next scan.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        TextliftError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file disappeared while it was being processed.".into(),
                    suggestion: "It may have been moved or deleted mid-scan; it will be picked up again if it returns.".into(),
                    severity: Severity::Transient,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "The item will be retried on the next scan.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        TextliftError::InvalidConfig(detail) => HumanError {
            message: "The configuration is not valid.".into(),
            suggestion: format!("Fix the configuration file and restart. ({detail})"),
            severity: Severity::ActionRequired,
        },

        TextliftError::Serialization(_) => HumanError {
            message: "The configuration file could not be parsed.".into(),
            suggestion: "Check that it is valid JSON.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_ocr_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("not found") || lower.contains("no such file") {
        HumanError {
            message: "The tesseract program could not be started.".into(),
            suggestion: "Install tesseract, or set TESSERACT_CMD to its full path.".into(),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("language") || lower.contains("traineddata") {
        HumanError {
            message: "The OCR language data is missing.".into(),
            suggestion: "Install the tesseract language pack named in the configuration.".into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "Text recognition failed on this image.".into(),
            suggestion: format!("The enhanced image was still saved. (Detail: {detail})"),
            severity: Severity::Transient,
        }
    }
}
