// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Renders collected search paths for shells or other tools.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

use crate::listing::ArchiveReport;
use crate::paths::AggregateStats;
use crate::pipeline::PipelineOutput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `PATH=...` and `LD_LIBRARY_PATH=...` lines.
    #[default]
    Env,
    /// Same as `env`, prefixed with `export` for `eval` in a shell.
    Export,
    /// A JSON document including per-archive results.
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    ld_library_path: String,
    executables: &'a [String],
    libraries: &'a [String],
    archives: &'a [ArchiveReport],
    stats: AggregateStats,
}

/// Write `output` to `writer` in the requested format.
///
/// # Errors
/// Returns an error if writing or serialization fails.
pub fn write_output(
    output: &PipelineOutput,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    let search_paths = &output.search_paths;
    match format {
        OutputFormat::Env => {
            writeln!(writer, "PATH={}", search_paths.path())?;
            writeln!(writer, "LD_LIBRARY_PATH={}", search_paths.ld_library_path())?;
        }
        OutputFormat::Export => {
            writeln!(writer, "export PATH={}", search_paths.path())?;
            writeln!(
                writer,
                "export LD_LIBRARY_PATH={}",
                search_paths.ld_library_path()
            )?;
        }
        OutputFormat::Json => {
            let report = JsonReport {
                path: search_paths.path(),
                ld_library_path: search_paths.ld_library_path(),
                executables: search_paths.executables(),
                libraries: search_paths.libraries(),
                archives: &output.archives,
                stats: output.stats,
            };
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
        }
    }
    writer.flush()
}
