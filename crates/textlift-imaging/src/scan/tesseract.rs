// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract OCR via its command-line program.
//
// The raster is written to a temporary PNG and `tesseract <png> stdout` is
// run; recognised text is read back from standard output. The executable's
// location is environment-specific and comes from configuration or
// `TESSERACT_CMD`.

use std::ffi::OsString;
use std::io::Write;
use std::process::Command;

use image::{GrayImage, ImageFormat};
use textlift_core::error::TextliftError;
use tracing::{debug, instrument, warn};

use crate::scan::extract::TextRecognizer;

/// Environment variable that overrides the configured tesseract executable.
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

/// Drives an installed `tesseract` binary.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: OsString,
    language: Option<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(command: impl Into<OsString>) -> Self {
        Self {
            command: command.into(),
            language: None,
        }
    }

    /// Pass `-l <language>` (e.g. `eng`, `eng+deu`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn command(&self) -> &OsString {
        &self.command
    }

    /// Run `tesseract --version` and return its first line.
    ///
    /// Used at start-up to warn early when the engine is not installed.
    pub fn version(&self) -> Result<String, TextliftError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|err| self.spawn_error(&err))?;
        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned())
    }

    fn arguments(&self, image_path: &std::path::Path) -> Vec<OsString> {
        let mut args = vec![image_path.as_os_str().to_owned(), OsString::from("stdout")];
        if let Some(language) = &self.language {
            args.push(OsString::from("-l"));
            args.push(OsString::from(language));
        }
        args
    }

    fn spawn_error(&self, err: &std::io::Error) -> TextliftError {
        TextliftError::Ocr(format!(
            "failed to run `{}`: {}",
            self.command.to_string_lossy(),
            err
        ))
    }
}

impl TextRecognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &GrayImage) -> Result<String, TextliftError> {
        let mut raster = tempfile::Builder::new()
            .prefix("textlift-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(raster.as_file_mut(), ImageFormat::Png)
            .map_err(|err| TextliftError::Ocr(format!("failed to stage OCR input: {err}")))?;
        raster.as_file_mut().flush()?;

        let output = Command::new(&self.command)
            .args(self.arguments(raster.path()))
            .output()
            .map_err(|err| self.spawn_error(&err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "tesseract exited with an error");
            return Err(TextliftError::Ocr(format!(
                "`{}` exited with {}: {}",
                self.command.to_string_lossy(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = output.stdout.len(), "tesseract output read");
        Ok(text)
    }
}
