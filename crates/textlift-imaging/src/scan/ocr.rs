// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process OCR with `ocrs` (models run on `rten`). Only built with the
// `ocr` feature.
//
// Two model files are needed, `text-detection.rten` and
// `text-recognition.rten`. Running `ocrs-cli` once downloads both into the
// ocrs cache folder, which is also where textlift looks when no
// `model_dir` is configured.

use std::path::{Path, PathBuf};

use image::GrayImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use textlift_core::error::TextliftError;
use tracing::{debug, info, instrument};

use crate::scan::extract::TextRecognizer;

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Locations of the detection and recognition models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::in_dir(ocrs_cache_dir())
    }
}

impl ModelPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL),
            recognition: dir.join(RECOGNITION_MODEL),
        }
    }

    /// First missing model, if any.
    pub fn missing(&self) -> Option<&Path> {
        [&self.detection, &self.recognition]
            .into_iter()
            .find(|path| !path.is_file())
            .map(PathBuf::as_path)
    }
}

fn ocrs_cache_dir() -> PathBuf {
    match (std::env::var_os("XDG_CACHE_HOME"), std::env::var_os("HOME")) {
        (Some(cache), _) => PathBuf::from(cache).join("ocrs"),
        (None, Some(home)) => PathBuf::from(home).join(".cache/ocrs"),
        (None, None) => PathBuf::from("ocrs-models"),
    }
}

fn load_model(path: &Path) -> Result<Model, TextliftError> {
    Model::load_file(path).map_err(|err| {
        TextliftError::OcrUnavailable(format!("cannot load {}: {err}", path.display()))
    })
}

/// The `ocrs` engine. Loaded once and shared by every item of every scan.
///
/// `rten` is very slow in debug builds; use `--release`.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    #[instrument(skip_all, fields(detection = %models.detection.display()))]
    pub fn new(models: ModelPaths) -> Result<Self, TextliftError> {
        if let Some(path) = models.missing() {
            return Err(TextliftError::OcrUnavailable(format!(
                "no model at {}; run `ocrs-cli` once to fetch the models",
                path.display()
            )));
        }

        info!("Loading ocrs models");
        let params = OcrEngineParams {
            detection_model: Some(load_model(&models.detection)?),
            recognition_model: Some(load_model(&models.recognition)?),
            ..Default::default()
        };
        let engine = OcrEngine::new(params)
            .map_err(|err| TextliftError::OcrUnavailable(format!("ocrs did not start: {err}")))?;
        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &GrayImage) -> Result<String, TextliftError> {
        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions())
            .map_err(|err| TextliftError::Ocr(format!("unusable raster: {err}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| TextliftError::Ocr(format!("ocrs preprocessing failed: {err}")))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| TextliftError::Ocr(format!("ocrs recognition failed: {err}")))?;

        debug!(lines = text.lines().count(), "ocrs finished");
        Ok(text)
    }
}
