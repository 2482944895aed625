// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal output that is not a log event: the banner and the prompt.

use std::io::{IsTerminal, Write};

use textlift_core::{PipelineConfig, ScanReport};

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[96m";
const MAGENTA: &str = "\x1b[95m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";

/// Colour only for an interactive terminal, and never when `NO_COLOR` is set.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn paint(colour: &str, text: &str) -> String {
    if color_enabled() {
        format!("{colour}{text}{RESET}")
    } else {
        text.to_owned()
    }
}

pub fn banner_text(config: &PipelineConfig) -> String {
    format!(
        "\
============================================
       textlift: image upscaler for OSINT
============================================
Clears blurry text in images by upscaling and sharpening, then extracts it.
============================================
Usage:
1. Place images (.png, .jpg, .jpeg) in '{input}'.
2. Upscaled images are saved in '{output}'.
3. Extracted text is saved as .txt files in '{text}'.
4. Press Enter to scan, or type 'exit' to quit. After each scan the
   program waits {delay} seconds before asking again.
============================================",
        input = config.input_dir.display(),
        output = config.output_dir.display(),
        text = config.text_dir.display(),
        delay = config.rescan_delay_secs,
    )
}

pub fn print_banner(config: &PipelineConfig) {
    println!("{}", paint(MAGENTA, &banner_text(config)));
}

/// Show the prompt without a trailing newline.
pub fn prompt() {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(
        stdout,
        "{}",
        paint(CYAN, "Press Enter to scan images or type 'exit' to quit: ")
    );
    let _ = stdout.flush();
}

pub fn summary_text(report: &ScanReport) -> String {
    let mut line = format!(
        "Scan finished: {} enhanced, {} skipped, {} failed, {} text file(s) written",
        report.processed(),
        report.skipped(),
        report.failed(),
        report.texts_written(),
    );
    if report.interrupted {
        line.push_str(" (interrupted)");
    }
    line
}

pub fn print_summary(report: &ScanReport) {
    let colour = if report.failed() > 0 || report.interrupted {
        YELLOW
    } else {
        GREEN
    };
    println!("{}", paint(colour, &summary_text(report)));
}
