// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use args::Args;
use package_paths::archives::{check_archives, read_archive_list, InputError};
use package_paths::output::write_output;
use package_paths::pipeline::{Pipeline, PipelineError};
use package_paths::logging;

/// An archive could not be opened or is not a regular file.
const EXIT_INVALID_INPUT: u8 = 42;
/// A listing process could not be started or its output could not be read.
const EXIT_LISTING_FAILED: u8 = 43;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let archives = collect_archives(args)?;
    check_archives(&archives)?;

    let pipeline = Pipeline::new(args.pipeline_config()).context("Invalid pipeline configuration")?;
    let output = pipeline
        .run(&archives)
        .context("Failed to collect search paths")?;

    write_output(&output, args.format, io::stdout().lock())
        .context("Failed to write search paths")?;
    Ok(())
}

fn collect_archives(args: &Args) -> Result<Vec<PathBuf>> {
    if args.from_stdin {
        Ok(read_archive_list(io::stdin().lock())?)
    } else {
        Ok(args.archives.clone())
    }
}

fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(input) = error.downcast_ref::<InputError>() {
        if !matches!(input, InputError::ReadListFailed { .. }) {
            return EXIT_INVALID_INPUT;
        }
    }
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::Listing(_) | PipelineError::WorkerPanicked { .. }) => {
            EXIT_LISTING_FAILED
        }
        _ => 1,
    }
}
