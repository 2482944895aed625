// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end scan loop tests against temporary folders, with a scripted OCR
// engine that answers by image size and counts its invocations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;
use textlift_core::error::{Result, TextliftError};
use textlift_core::{ItemOutcome, PipelineConfig, TextOutcome};
use textlift_imaging::TextRecognizer;
use textlift_pipeline::{CancelFlag, LoopState, ScanLoop};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Reply {
    Text(&'static str),
    Fail,
    Panic,
}

/// OCR stand-in keyed on the (enhanced) image dimensions.
struct Scripted {
    replies: HashMap<(u32, u32), Reply>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(replies: &[((u32, u32), Reply)]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scripted = Self {
            replies: replies.iter().cloned().collect(),
            calls: Arc::clone(&calls),
        };
        (scripted, calls)
    }
}

impl TextRecognizer for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &GrayImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(&image.dimensions()) {
            Some(Reply::Text(text)) => Ok((*text).to_owned()),
            Some(Reply::Fail) => Err(TextliftError::Ocr("engine exited with status 1".into())),
            Some(Reply::Panic) => panic!("scripted engine crash"),
            None => Ok(String::new()),
        }
    }
}

struct Workspace {
    _root: TempDir,
    config: PipelineConfig,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::rooted_at(root.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        Self {
            _root: root,
            config,
        }
    }

    fn input(&self, name: &str) -> PathBuf {
        self.config.input_dir.join(name)
    }

    fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    fn text(&self, name: &str) -> PathBuf {
        self.config.text_dir.join(name)
    }

    /// Save a decodable image of the given size; the format follows the extension.
    fn add_image(&self, name: &str, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 3 == 0 {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 230, 230])
            }
        });
        DynamicImage::ImageRgb8(img).save(self.input(name)).unwrap();
    }

    fn add_corrupt(&self, name: &str) {
        std::fs::write(self.input(name), b"definitely not an image").unwrap();
    }

    fn scan_loop(&self, recognizer: Scripted) -> ScanLoop<Scripted> {
        ScanLoop::new(self.config.clone(), recognizer).expect("valid config")
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn good_and_corrupt_item_in_one_scan() {
    let ws = Workspace::new();
    ws.add_image("a.png", 10, 8);
    ws.add_corrupt("b.jpg");

    let (ocr, calls) = Scripted::new(&[((20, 16), Reply::Text("HELLO"))]);
    let mut scan = ws.scan_loop(ocr);
    let report = scan.scan_once(&CancelFlag::new()).unwrap();

    let upscaled = image::open(ws.output("a.png")).unwrap();
    assert_eq!((upscaled.width(), upscaled.height()), (20, 16));
    assert_eq!(std::fs::read_to_string(ws.text("a.txt")).unwrap(), "HELLO");

    assert!(!ws.output("b.jpg").exists());
    assert!(!ws.text("b.txt").exists());
    assert!(matches!(
        report.outcome("b.jpg"),
        Some(ItemOutcome::DecodeFailure { reason }) if reason.contains("b.jpg")
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(scan.state(), LoopState::Idle);
    assert!(!report.interrupted);
}

#[test]
fn rerun_writes_nothing_and_skips_ocr() {
    let ws = Workspace::new();
    ws.add_image("a.png", 10, 8);
    ws.add_corrupt("b.jpg");

    let (ocr, calls) = Scripted::new(&[((20, 16), Reply::Text("HELLO"))]);
    let mut scan = ws.scan_loop(ocr);
    scan.scan_once(&CancelFlag::new()).unwrap();

    let outputs_before = file_names(&ws.config.output_dir);
    let texts_before = file_names(&ws.config.text_dir);
    let modified_before = std::fs::metadata(ws.output("a.png")).unwrap().modified().unwrap();

    let report = scan.scan_once(&CancelFlag::new()).unwrap();

    assert_eq!(report.outcome("a.png"), Some(&ItemOutcome::Skipped));
    assert_eq!(report.processed(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "OCR must not run again");
    assert_eq!(file_names(&ws.config.output_dir), outputs_before);
    assert_eq!(file_names(&ws.config.text_dir), texts_before);
    assert_eq!(
        std::fs::metadata(ws.output("a.png")).unwrap().modified().unwrap(),
        modified_before
    );
    // The corrupt file has no output, so it is retried (and fails again).
    assert!(matches!(report.outcome("b.jpg"), Some(ItemOutcome::DecodeFailure { .. })));
}

#[test]
fn existing_output_skips_enhance_ocr_and_writes() {
    let ws = Workspace::new();
    // Undecodable input: reaching the enhancer would turn this into a DecodeFailure.
    ws.add_corrupt("c.png");
    std::fs::create_dir_all(&ws.config.output_dir).unwrap();
    std::fs::write(ws.output("c.png"), b"previous result").unwrap();

    let (ocr, calls) = Scripted::new(&[]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    assert_eq!(report.outcome("c.png"), Some(&ItemOutcome::Skipped));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read(ws.output("c.png")).unwrap(), b"previous result");
    assert!(!ws.text("c.txt").exists());
}

#[test]
fn one_corrupt_item_does_not_stop_the_batch() {
    let ws = Workspace::new();
    let names = ["1.png", "2.png", "3.png", "4.jpg", "5.jpeg"];
    for (i, name) in names.iter().enumerate() {
        if i == 2 {
            ws.add_corrupt(name);
        } else {
            ws.add_image(name, 6 + i as u32, 6);
        }
    }

    let (ocr, calls) = Scripted::new(&[]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    assert_eq!(report.items.len(), 5);
    assert_eq!(report.processed(), 4);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.outcome("3.png"), Some(ItemOutcome::DecodeFailure { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    for name in ["1.png", "2.png", "4.jpg", "5.jpeg"] {
        assert!(ws.output(name).is_file(), "{name} should have been written");
    }
}

#[test]
fn empty_text_writes_image_but_no_text_file() {
    let ws = Workspace::new();
    ws.add_image("blank.png", 7, 7);

    let (ocr, _) = Scripted::new(&[((14, 14), Reply::Text("  \n\t "))]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    assert!(ws.output("blank.png").is_file());
    assert!(!ws.text("blank.txt").exists());
    assert_eq!(
        report.outcome("blank.png"),
        Some(&ItemOutcome::Enhanced {
            output_path: ws.output("blank.png"),
            text: TextOutcome::Empty,
        })
    );
}

#[test]
fn ocr_failure_keeps_the_enhanced_image() {
    let ws = Workspace::new();
    ws.add_image("a.png", 5, 5);
    ws.add_image("z.png", 6, 6);

    let (ocr, calls) = Scripted::new(&[
        ((10, 10), Reply::Fail),
        ((12, 12), Reply::Text("LAST")),
    ]);
    let mut scan = ws.scan_loop(ocr);
    let report = scan.scan_once(&CancelFlag::new()).unwrap();

    assert!(matches!(report.outcome("a.png"), Some(ItemOutcome::OcrFailure { .. })));
    assert!(ws.output("a.png").is_file());
    assert!(!ws.text("a.txt").exists());
    assert_eq!(std::fs::read_to_string(ws.text("z.txt")).unwrap(), "LAST");

    // The image exists, so the partial result counts as done.
    let again = scan.scan_once(&CancelFlag::new()).unwrap();
    assert_eq!(again.outcome("a.png"), Some(&ItemOutcome::Skipped));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn panicking_engine_is_contained() {
    let ws = Workspace::new();
    ws.add_image("a.png", 4, 4);
    ws.add_image("b.png", 5, 5);

    let (ocr, _) = Scripted::new(&[((8, 8), Reply::Panic), ((10, 10), Reply::Text("OK"))]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    match report.outcome("a.png") {
        Some(ItemOutcome::OcrFailure { reason, .. }) => {
            assert!(reason.contains("scripted engine crash"), "{reason}")
        }
        other => panic!("expected OcrFailure, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(ws.text("b.txt")).unwrap(), "OK");
}

#[test]
fn deleted_output_is_reprocessed() {
    let ws = Workspace::new();
    ws.add_image("a.png", 3, 3);

    let (ocr, calls) = Scripted::new(&[((6, 6), Reply::Text("AGAIN"))]);
    let mut scan = ws.scan_loop(ocr);
    scan.scan_once(&CancelFlag::new()).unwrap();
    std::fs::remove_file(ws.output("a.png")).unwrap();

    let report = scan.scan_once(&CancelFlag::new()).unwrap();
    assert!(matches!(report.outcome("a.png"), Some(ItemOutcome::Enhanced { .. })));
    assert!(ws.output("a.png").is_file());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn png_saved_with_jpeg_name_is_enhanced() {
    let ws = Workspace::new();
    RgbImage::from_pixel(5, 4, Rgb([240, 240, 240]))
        .save_with_format(ws.input("shot.jpg"), image::ImageFormat::Png)
        .unwrap();

    let (ocr, calls) = Scripted::new(&[((10, 8), Reply::Text("CAPTION"))]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    assert!(
        matches!(report.outcome("shot.jpg"), Some(ItemOutcome::Enhanced { .. })),
        "{report:?}"
    );
    let out = image::open(ws.output("shot.jpg")).unwrap();
    assert_eq!((out.width(), out.height()), (10, 8));
    assert_eq!(std::fs::read_to_string(ws.text("shot.txt")).unwrap(), "CAPTION");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn text_write_failure_is_isolated() {
    let ws = Workspace::new();
    ws.add_image("a.png", 4, 4);
    ws.add_image("b.png", 5, 5);
    // A directory squatting on the text path makes the final rename fail.
    std::fs::create_dir_all(ws.text("a.txt")).unwrap();

    let (ocr, calls) = Scripted::new(&[((8, 8), Reply::Text("A")), ((10, 10), Reply::Text("B"))]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    match report.outcome("a.png") {
        Some(ItemOutcome::WriteFailure { path, .. }) => assert_eq!(path, &ws.text("a.txt")),
        other => panic!("expected WriteFailure, got {other:?}"),
    }
    assert!(ws.output("a.png").is_file());
    assert!(ws.text("a.txt").is_dir());

    assert_eq!(
        report.outcome("b.png"),
        Some(&ItemOutcome::Enhanced {
            output_path: ws.output("b.png"),
            text: TextOutcome::Written(ws.text("b.txt")),
        })
    );
    assert_eq!(std::fs::read_to_string(ws.text("b.txt")).unwrap(), "B");
    assert_eq!(report.failed(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn only_supported_extensions_are_scanned() {
    let ws = Workspace::new();
    ws.add_image("UPPER.PNG", 4, 4);
    ws.add_image("photo.JPEG", 4, 4);
    std::fs::write(ws.input("notes.txt"), "ignore me").unwrap();
    GrayImage::from_pixel(4, 4, Luma([0]))
        .save(ws.input("anim.gif"))
        .unwrap();

    let (ocr, _) = Scripted::new(&[]);
    let report = ws.scan_loop(ocr).scan_once(&CancelFlag::new()).unwrap();

    let names: Vec<&str> = report.items.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["UPPER.PNG", "photo.JPEG"]);
    assert_eq!(file_names(&ws.config.output_dir), vec!["UPPER.PNG", "photo.JPEG"]);
    let jpeg = image::open(ws.output("photo.JPEG")).unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (8, 8));
}

#[test]
fn empty_input_creates_folders_and_reports_nothing() {
    let root = tempfile::tempdir().unwrap();
    let config = PipelineConfig::rooted_at(root.path());
    let (ocr, calls) = Scripted::new(&[]);
    let mut scan = ScanLoop::new(config.clone(), ocr).unwrap();

    let report = scan.scan_once(&CancelFlag::new()).unwrap();

    assert!(report.items.is_empty());
    assert!(config.input_dir.is_dir());
    assert!(config.output_dir.is_dir());
    assert!(config.text_dir.is_dir());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn folder_setup_failure_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("occupied");
    std::fs::write(&blocker, b"").unwrap();
    let config = PipelineConfig {
        text_dir: blocker.join("texts"),
        ..PipelineConfig::rooted_at(root.path())
    };

    let (ocr, _) = Scripted::new(&[]);
    let err = ScanLoop::new(config, ocr)
        .unwrap()
        .scan_once(&CancelFlag::new())
        .unwrap_err();
    assert!(err.is_fatal(), "{err:?}");
}

#[test]
fn cancelled_scan_stops_before_the_next_item() {
    let ws = Workspace::new();
    ws.add_image("a.png", 3, 3);
    ws.add_image("b.png", 3, 3);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let (ocr, calls) = Scripted::new(&[]);
    let report = ws.scan_loop(ocr).scan_once(&cancel).unwrap();

    assert!(report.interrupted);
    assert!(report.items.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(file_names(&ws.config.output_dir).is_empty());
}

#[test]
fn custom_scale_factor_is_honoured() {
    let ws = Workspace::new();
    ws.add_image("a.png", 4, 6);
    let config = PipelineConfig {
        scale_factor: 3.0,
        ..ws.config.clone()
    };

    let (ocr, _) = Scripted::new(&[]);
    ScanLoop::new(config, ocr)
        .unwrap()
        .scan_once(&CancelFlag::new())
        .unwrap();

    let out = image::open(ws.output("a.png")).unwrap();
    assert_eq!((out.width(), out.height()), (12, 18));
}
