// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder setup, input listing and atomic output writes.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;
use textlift_core::error::{Result, TextliftError};
use textlift_core::{ImageFormatKind, ImageItem, PipelineConfig};
use textlift_imaging::image::processor::encode_into;
use tracing::{debug, info, instrument, warn};

/// Create the output, text and input folders if they are missing.
///
/// # Errors
///
/// Returns [`TextliftError::StorageSetup`] naming the folder that could not be
/// created. This is fatal for the process.
pub fn ensure_dirs(config: &PipelineConfig) -> Result<()> {
    for dir in [&config.output_dir, &config.text_dir, &config.input_dir] {
        if dir.is_dir() {
            continue;
        }
        info!(folder = %dir.display(), "Folder does not exist. Creating it");
        std::fs::create_dir_all(dir).map_err(|source| TextliftError::StorageSetup {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Supported images in `input_dir`, sorted by filename.
///
/// Subdirectories and files with other extensions are ignored.
#[instrument(skip_all, fields(dir = %input_dir.as_ref().display()))]
pub fn list_items(input_dir: impl AsRef<Path>) -> Result<Vec<ImageItem>> {
    let mut items = Vec::new();
    for entry in std::fs::read_dir(input_dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if ImageFormatKind::from_path(&path).is_none() {
            continue;
        }
        match ImageItem::from_path(&path) {
            Some(item) => items.push(item),
            None => warn!(
                path = %path.display(),
                "Skipping image whose file name is not valid UTF-8; rename it to process it"
            ),
        }
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = items.len(), "Input folder listed");
    Ok(items)
}

fn image_format(kind: ImageFormatKind) -> ImageFormat {
    match kind {
        ImageFormatKind::Png => ImageFormat::Png,
        ImageFormatKind::Jpeg => ImageFormat::Jpeg,
    }
}

/// A temp file beside `dest`, so the final rename stays on one filesystem.
fn staging_file(dest: &Path) -> Result<NamedTempFile> {
    let dir = dest.parent().unwrap_or(Path::new("."));
    NamedTempFile::new_in(dir).map_err(|source| TextliftError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

fn publish(staged: NamedTempFile, dest: &Path) -> Result<()> {
    staged
        .persist(dest)
        .map_err(|err| TextliftError::Write {
            path: dest.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}

/// Encode `image` and move it to `dest` in one rename.
///
/// Readers of the output folder never see a partially written image under
/// its final name.
pub fn write_image_atomic(image: &DynamicImage, dest: &Path, format: ImageFormatKind) -> Result<()> {
    let mut staged = staging_file(dest)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        encode_into(image, &mut writer, image_format(format)).map_err(|reason| {
            TextliftError::Encode {
                path: dest.to_path_buf(),
                reason,
            }
        })?;
        writer.flush().map_err(|source| TextliftError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    }
    publish(staged, dest)
}

/// Write `text` as UTF-8 to `dest`, replacing any previous file.
pub fn write_text_atomic(text: &str, dest: &Path) -> Result<()> {
    let mut staged = staging_file(dest)?;
    staged
        .write_all(text.as_bytes())
        .map_err(|source| TextliftError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    publish(staged, dest)
}

/// Output path for an item's enhanced image.
pub fn image_output_path(config: &PipelineConfig, item: &ImageItem) -> PathBuf {
    config.output_dir.join(&item.name)
}

/// Output path for an item's text artifact.
pub fn text_output_path(config: &PipelineConfig, item: &ImageItem) -> PathBuf {
    config.text_dir.join(item.text_name())
}
