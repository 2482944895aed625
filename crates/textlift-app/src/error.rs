// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Errors that end the program.

use textlift_core::TextliftError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] TextliftError),

    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("console input failed: {0}")]
    Console(#[from] std::io::Error),
}
