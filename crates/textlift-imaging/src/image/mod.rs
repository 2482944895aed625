// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode, resize, convolve and encode.

pub mod kernel;
pub mod processor;

pub use kernel::Kernel3x3;
pub use processor::ImageProcessor;
