// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for deriving `PATH` and `LD_LIBRARY_PATH` from package archives.
//!
//! This crate provides functionality to:
//! - List archive contents concurrently with an external tool (`rpm -qlvp` by default)
//! - Classify listed files as executables or libraries
//! - Collect the unique containing directories into search path strings

pub mod archives;
pub mod listing;
pub mod logging;
pub mod output;
pub mod paths;
pub mod pipeline;

// Re-export key types for convenience
pub use listing::{ArchiveOutcome, ArchiveReport, ListingCommand, ListingError};
pub use paths::{ClassifiedPath, LineClassifier, PathKind, SearchPaths};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutput};
