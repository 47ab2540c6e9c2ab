// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Errors raised while listing archive contents. Every variant here aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for listing operations.
pub type ListingResult<T> = std::result::Result<T, ListingError>;

/// Fatal errors that can occur while listing archives.
///
/// Recoverable problems (non-zero exit, timeout) are not errors; they are reported
/// through [`super::ArchiveOutcome`] instead.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Command not found: {command} (archive: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (archive: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to get stdout from {command} (archive: {path:?})")]
    PipeUnavailable { command: String, path: PathBuf },
    #[error("Failed to read output of {command} (archive: {path:?})")]
    ReadFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line exceeds {limit} bytes in output of {command} (archive: {path:?})")]
    LineTooLong {
        command: String,
        path: PathBuf,
        limit: usize,
    },
    #[error("Line channel closed while listing archive {path:?}")]
    Disconnected { path: PathBuf },
    #[error("Listing thread panicked for archive {path:?}")]
    StreamerPanicked { path: PathBuf },
}
