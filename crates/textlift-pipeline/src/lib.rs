// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textlift-pipeline — The folder scan loop.
//
// Lists the input folder, skips items whose enhanced output already exists,
// and for each remaining image runs enhance -> persist -> OCR -> persist,
// isolating failures to the item they happen in.

pub mod dedup;
pub mod scan_loop;
pub mod storage;

pub use dedup::DedupTracker;
pub use scan_loop::{CancelFlag, LoopState, LoopStatus, ScanLoop};
