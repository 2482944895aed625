// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextliftError};

/// The classic 3x3 sharpening kernel: centre 5, orthogonal neighbours -1.
pub const DEFAULT_SHARPEN_KERNEL: [[f32; 3]; 3] =
    [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Settings injected into the scan loop at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Folder polled for new images.
    pub input_dir: PathBuf,
    /// Folder receiving enhanced images (same filename as the input).
    pub output_dir: PathBuf,
    /// Folder receiving `<stem>.txt` text artifacts.
    pub text_dir: PathBuf,
    /// Upscale factor applied to both width and height.
    pub scale_factor: f32,
    /// Sharpening kernel applied after the resize, row-major.
    pub sharpen_kernel: [[f32; 3]; 3],
    /// Passive delay after a completed scan before prompting again.
    pub rescan_delay_secs: u64,
    /// Which OCR engine to drive.
    pub ocr: OcrBackend,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("user images to upscale"),
            output_dir: PathBuf::from("upscaled images"),
            text_dir: PathBuf::from("extracted_texts"),
            scale_factor: 2.0,
            sharpen_kernel: DEFAULT_SHARPEN_KERNEL,
            rescan_delay_secs: 10,
            ocr: OcrBackend::default(),
        }
    }
}

impl PipelineConfig {
    /// Config rooted at `base`, keeping the default folder names.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let defaults = Self::default();
        Self {
            input_dir: base.join(&defaults.input_dir),
            output_dir: base.join(&defaults.output_dir),
            text_dir: base.join(&defaults.text_dir),
            ..defaults
        }
    }

    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a scan relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(TextliftError::InvalidConfig(format!(
                "scale_factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        if self.sharpen_kernel.iter().flatten().any(|w| !w.is_finite()) {
            return Err(TextliftError::InvalidConfig(
                "sharpen_kernel contains a non-finite weight".into(),
            ));
        }
        let dirs = [&self.input_dir, &self.output_dir, &self.text_dir];
        for (i, a) in dirs.iter().enumerate() {
            if dirs[i + 1..].contains(a) {
                return Err(TextliftError::InvalidConfig(format!(
                    "folder {} is used for more than one role",
                    a.display()
                )));
            }
        }
        Ok(())
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum OcrBackend {
    /// The `tesseract` command-line program.
    Tesseract {
        /// Executable name or absolute path.
        #[serde(default = "default_tesseract_command")]
        command: String,
        /// Optional `-l` language, e.g. `eng` or `eng+deu`.
        #[serde(default)]
        language: Option<String>,
    },
    /// The pure-Rust `ocrs` engine (requires the `ocr` feature).
    Ocrs {
        /// Directory holding `text-detection.rten` and `text-recognition.rten`.
        /// `None` means the XDG cache default.
        #[serde(default)]
        model_dir: Option<PathBuf>,
    },
}

fn default_tesseract_command() -> String {
    "tesseract".into()
}

impl Default for OcrBackend {
    fn default() -> Self {
        Self::Tesseract {
            command: default_tesseract_command(),
            language: None,
        }
    }
}
