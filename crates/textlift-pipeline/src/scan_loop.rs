// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan loop: one pass over the input folder per trigger.
//
// Per item: dedup check, enhance, persist the image, OCR the persisted image,
// persist non-empty text. Every per-item problem becomes an `ItemOutcome`;
// only folder setup errors leave `scan_once` as `Err`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use textlift_core::error::{Result, TextliftError};
use textlift_core::human_errors::humanize_error;
use textlift_core::{ImageItem, ItemOutcome, PipelineConfig, ScanReport, TextOutcome};
use textlift_imaging::{Enhancer, TextExtractor, TextRecognizer};
use tracing::{error, info, instrument, warn};

use crate::dedup::DedupTracker;
use crate::storage;

/// Cooperative cancellation shared between the shell and a running scan.
///
/// The scan checks it before each item, so the item in flight always
/// finishes and no output is left half-written.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether a scan is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for a trigger.
    Idle,
    /// Iterating the input folder.
    Scanning,
}

/// Shared view of a loop's [`LoopState`].
///
/// Clones stay readable from other threads while the loop itself has moved
/// onto a blocking worker for a scan.
#[derive(Debug, Clone, Default)]
pub struct LoopStatus(Arc<AtomicBool>);

impl LoopStatus {
    pub fn state(&self) -> LoopState {
        if self.0.load(Ordering::SeqCst) {
            LoopState::Scanning
        } else {
            LoopState::Idle
        }
    }

    fn set(&self, state: LoopState) {
        self.0.store(state == LoopState::Scanning, Ordering::SeqCst);
    }
}

/// Drives scans over the configured folders.
pub struct ScanLoop<R> {
    config: PipelineConfig,
    enhancer: Enhancer,
    extractor: TextExtractor<R>,
    status: LoopStatus,
}

impl<R: TextRecognizer> ScanLoop<R> {
    /// Build a loop from a validated configuration and an OCR engine.
    pub fn new(config: PipelineConfig, recognizer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            enhancer: Enhancer::from_config(&config),
            extractor: TextExtractor::new(recognizer),
            config,
            status: LoopStatus::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.status.state()
    }

    /// A handle that follows this loop's state from anywhere.
    pub fn status(&self) -> LoopStatus {
        self.status.clone()
    }

    pub fn extractor(&self) -> &TextExtractor<R> {
        &self.extractor
    }

    /// Run one full pass over the input folder.
    ///
    /// # Errors
    ///
    /// Only folder setup and listing problems are returned; see
    /// [`TextliftError::is_fatal`]. Item failures are in the report.
    #[instrument(skip_all, fields(input = %self.config.input_dir.display()))]
    pub fn scan_once(&mut self, cancel: &CancelFlag) -> Result<ScanReport> {
        self.status.set(LoopState::Scanning);
        let result = self.run_scan(cancel);
        self.status.set(LoopState::Idle);
        result
    }

    fn run_scan(&self, cancel: &CancelFlag) -> Result<ScanReport> {
        info!("Checking for images in '{}'", self.config.input_dir.display());
        storage::ensure_dirs(&self.config)?;

        let items = storage::list_items(&self.config.input_dir)?;
        let mut report = ScanReport::default();
        if items.is_empty() {
            warn!("No images found in '{}'", self.config.input_dir.display());
            return Ok(report);
        }
        info!(count = items.len(), "Found {} image(s) to process", items.len());

        let dedup = DedupTracker::scan(&self.config.output_dir)?;
        for item in items {
            if cancel.is_cancelled() {
                warn!("Scan interrupted; remaining images will be picked up next time");
                report.interrupted = true;
                break;
            }
            let outcome = self.process_item(&item, &dedup);
            report.items.push((item.name, outcome));
        }

        info!(
            processed = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            texts = report.texts_written(),
            "Scan complete"
        );
        Ok(report)
    }

    /// Process a single item. Never fails: every problem is an outcome.
    pub fn process_item(&self, item: &ImageItem, dedup: &DedupTracker) -> ItemOutcome {
        if dedup.should_skip(&item.name) {
            warn!(item = %item.name, "Skipping already processed image");
            return ItemOutcome::Skipped;
        }
        info!(item = %item.name, format = item.format.mime_type(), "Processing");

        let enhanced = match guarded(|| self.enhancer.enhance_file(&item.source_path), |panic| {
            TextliftError::Decode {
                path: item.source_path.clone(),
                reason: format!("decoder panicked: {panic}"),
            }
        }) {
            Ok(image) => image,
            Err(err) => {
                report_failure(item, "enhance", &err);
                return ItemOutcome::DecodeFailure {
                    reason: err.to_string(),
                };
            }
        };

        let output_path = storage::image_output_path(&self.config, item);
        if let Err(err) = storage::write_image_atomic(&enhanced, &output_path, item.format) {
            report_failure(item, "save image", &err);
            return ItemOutcome::WriteFailure {
                path: output_path,
                reason: err.to_string(),
            };
        }
        drop(enhanced);
        info!(item = %item.name, path = %output_path.display(), "Saved upscaled image");

        // OCR reads the file back so it sees exactly the bytes that were saved.
        let text = match guarded(|| self.extractor.extract_file(&output_path), |panic| {
            TextliftError::Ocr(format!("engine panicked: {panic}"))
        }) {
            Ok(text) => text,
            Err(err) => {
                report_failure(item, "extract text", &err);
                return ItemOutcome::OcrFailure {
                    output_path,
                    reason: err.to_string(),
                };
            }
        };

        if text.is_empty() {
            warn!(item = %item.name, "No text extracted");
            return ItemOutcome::Enhanced {
                output_path,
                text: TextOutcome::Empty,
            };
        }

        let text_path = storage::text_output_path(&self.config, item);
        if let Err(err) = storage::write_text_atomic(&text, &text_path) {
            report_failure(item, "save text", &err);
            return ItemOutcome::WriteFailure {
                path: text_path,
                reason: err.to_string(),
            };
        }
        info!(item = %item.name, path = %text_path.display(), "Saved extracted text");

        ItemOutcome::Enhanced {
            output_path,
            text: TextOutcome::Written(text_path),
        }
    }
}

/// Run `step`, turning a panic inside it into an error for this item.
fn guarded<T>(
    step: impl FnOnce() -> Result<T>,
    on_panic: impl FnOnce(String) -> TextliftError,
) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_owned());
            Err(on_panic(message))
        }
    }
}

fn report_failure(item: &ImageItem, stage: &str, err: &TextliftError) {
    let human = humanize_error(err);
    error!(
        item = %item.name,
        stage,
        error = %err,
        hint = %human.suggestion,
        "Failed to process image {}: {}",
        item.name,
        human.message
    );
}
