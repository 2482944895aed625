// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration loading.
//
// `$TEXTLIFT_CONFIG` names a JSON file that must exist; otherwise
// `textlift.json` in the working directory is used when present, and the
// built-in defaults when not. `$TESSERACT_CMD` overrides the tesseract path.

use std::path::{Path, PathBuf};

use textlift_core::error::Result;
use textlift_core::{OcrBackend, PipelineConfig};
use textlift_imaging::scan::tesseract::TESSERACT_CMD_ENV;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "TEXTLIFT_CONFIG";
const CONFIG_FILE: &str = "textlift.json";

pub fn load() -> Result<PipelineConfig> {
    let (path, required) = match std::env::var_os(CONFIG_ENV) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };
    let tesseract_override = std::env::var(TESSERACT_CMD_ENV).ok();

    let mut config = load_from(&path, required)?;
    apply_tesseract_override(&mut config, tesseract_override.as_deref());
    debug!(config = %serde_json::to_string(&config)?, "Effective configuration");
    Ok(config)
}

/// Read `path`; a missing optional file means defaults.
pub fn load_from(path: &Path, required: bool) -> Result<PipelineConfig> {
    match std::fs::read_to_string(path) {
        Ok(json) => {
            let config = PipelineConfig::from_json(&json)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            let config = PipelineConfig::default();
            config.validate()?;
            Ok(config)
        }
        Err(err) => Err(err.into()),
    }
}

fn apply_tesseract_override(config: &mut PipelineConfig, command: Option<&str>) {
    let Some(command) = command.filter(|c| !c.trim().is_empty()) else {
        return;
    };
    if let OcrBackend::Tesseract { command: configured, .. } = &mut config.ocr {
        info!(command, "Using tesseract from {}", TESSERACT_CMD_ENV);
        *configured = command.to_owned();
    }
}
