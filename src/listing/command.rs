// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! The command template used to list the contents of one archive.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

/// Program plus fixed listing flags. The archive path is always appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCommand {
    program: String,
    flags: Vec<String>,
}

impl ListingCommand {
    pub const RPM_PROGRAM: &'static str = "rpm";
    pub const RPM_FLAGS: &'static str = "-qlvp";

    pub fn new(
        program: impl Into<String>,
        flags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// `rpm -qlvp <archive>`: verbose file listing of a package file.
    #[must_use]
    pub fn rpm() -> Self {
        Self::new(Self::RPM_PROGRAM, [Self::RPM_FLAGS])
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Build the process invocation for `archive` with stdout piped.
    pub(crate) fn command_for(&self, archive: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.flags)
            .arg(archive)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        command
    }
}

impl Default for ListingCommand {
    fn default() -> Self {
        Self::rpm()
    }
}

impl fmt::Display for ListingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for flag in &self.flags {
            write!(f, " {flag}")?;
        }
        Ok(())
    }
}
