// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Gathers archive paths and checks that they can be listed.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Result type for archive input checks.
pub type InputResult<T> = std::result::Result<T, InputError>;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Problem opening file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Problem stat'ing file: {path:?}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Is not a regular file: {path:?}")]
    NotAFile { path: PathBuf },
    #[error("Failed to read archive list")]
    ReadListFailed {
        #[source]
        source: io::Error,
    },
}

/// Read archive paths one per line. Surrounding whitespace is trimmed and blank lines are skipped.
///
/// # Errors
/// Returns an error if the reader fails.
pub fn read_archive_list(reader: impl BufRead) -> InputResult<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| InputError::ReadListFailed { source: e })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            archives.push(PathBuf::from(trimmed));
        }
    }
    Ok(archives)
}

/// Check that an archive can be opened for reading and is a regular file.
///
/// # Errors
/// Returns an error describing the first check that failed.
pub fn check_archive(path: &Path) -> InputResult<()> {
    let file = File::open(path).map_err(|e| InputError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let metadata = file.metadata().map_err(|e| InputError::StatFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_file() {
        return Err(InputError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Check every archive, stopping at the first one that fails.
///
/// # Errors
/// Returns the error of the first archive that cannot be listed.
pub fn check_archives(paths: &[PathBuf]) -> InputResult<()> {
    for path in paths {
        if let Err(e) = check_archive(path) {
            error!(archive = %path.display(), "{e}");
            return Err(e);
        }
    }
    Ok(())
}
