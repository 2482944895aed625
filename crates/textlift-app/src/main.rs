// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textlift — watch a folder, upscale and sharpen images, extract their text.
//
// Entry point. Initialises logging, loads configuration, builds the OCR
// engine and scan loop, and hands control to the interactive shell.

mod console;
mod error;
mod settings;
mod shell;

use std::process::ExitCode;

use textlift_core::OcrBackend;
use textlift_core::human_errors::humanize_error;
use textlift_imaging::{TesseractCli, recognizer_from_config};
use textlift_pipeline::ScanLoop;
use tracing::{error, info, warn};

use error::AppError;
use shell::{Shell, ShellExit};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(console::color_enabled())
        .init();

    match run().await {
        Ok(exit) => {
            info!(reason = ?exit, "textlift stopped");
            ExitCode::SUCCESS
        }
        Err(AppError::Pipeline(err)) => {
            let human = humanize_error(&err);
            error!(error = %err, hint = %human.suggestion, "{}", human.message);
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "An unexpected error occurred");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ShellExit, AppError> {
    let config = settings::load()?;
    console::print_banner(&config);
    info!("Starting textlift");

    if let OcrBackend::Tesseract { command, .. } = &config.ocr {
        match TesseractCli::new(command).version() {
            Ok(version) => info!(engine = %version, "OCR engine found"),
            Err(err) => warn!(
                error = %err,
                "tesseract is not usable; images will still be enhanced but text extraction will fail"
            ),
        }
    }

    let recognizer = recognizer_from_config(&config.ocr)?;
    let scan_loop = ScanLoop::new(config, recognizer)?;

    let interrupts = shell::listen_for_interrupts(scan_loop.status());
    let commands = shell::spawn_stdin_reader();
    Shell::new(scan_loop, interrupts).run(commands).await
}

