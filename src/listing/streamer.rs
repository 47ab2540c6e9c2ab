// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Runs one listing process and forwards each line of its stdout to a channel.

use serde::Serialize;
use std::io::{self, BufRead, BufReader, Read};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, ExitStatus};
use std::sync::mpsc::SyncSender;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::command::ListingCommand;
use super::errors::{ListingError, ListingResult};

/// Default upper bound for a single output line (matches the common 64 KiB scanner limit).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// How a single listing process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    Completed,
    Failed { reason: String },
    TimedOut { timeout: Duration },
}

/// Summary of one archive's listing, sent as the streamer's done signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    pub lines: usize,
    pub outcome: ArchiveOutcome,
}

/// Knobs applied to every streamer in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// `None` waits for the process forever.
    pub timeout: Option<Duration>,
    pub max_line_length: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

enum ReadFailure {
    Io(io::Error),
    TooLong,
    Disconnected,
}

enum Exit {
    Status(ExitStatus),
    TimedOut(Duration),
}

/// A started listing process whose stdout has not been consumed yet.
pub(crate) struct LineStreamer {
    archive: PathBuf,
    command: String,
    child: Child,
    stdout: ChildStdout,
}

impl LineStreamer {
    /// Start the listing process for `archive`.
    ///
    /// # Errors
    /// Returns an error if the process cannot be started or its stdout cannot be captured.
    pub(crate) fn spawn(command: &ListingCommand, archive: &Path) -> ListingResult<Self> {
        let mut child = match command.command_for(archive).spawn() {
            Ok(child) => child,
            Err(e) => {
                if e.kind() == io::ErrorKind::NotFound {
                    return Err(ListingError::CommandNotFound {
                        command: command.program().to_string(),
                        path: archive.to_path_buf(),
                    });
                }
                return Err(ListingError::CommandFailed {
                    command: command.program().to_string(),
                    path: archive.to_path_buf(),
                    source: e,
                });
            }
        };

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ListingError::PipeUnavailable {
                command: command.program().to_string(),
                path: archive.to_path_buf(),
            });
        };

        debug!(archive = %archive.display(), command = %command, "Listing started");
        Ok(Self {
            archive: archive.to_path_buf(),
            command: command.to_string(),
            child,
            stdout,
        })
    }

    /// Forward every stdout line to `lines`, then reap the process.
    ///
    /// The output is drained on its own thread while this thread waits on the process, so
    /// the child never blocks on a full pipe. Returns only once both the output has reached
    /// end-of-file and the process has been waited on.
    ///
    /// # Errors
    /// Returns an error if reading the output fails, a line is too long, or the line channel
    /// is closed. A non-zero exit status or a timeout is not an error; it is logged and
    /// reported in the returned [`ArchiveReport`].
    pub(crate) fn stream(
        self,
        lines: &SyncSender<String>,
        options: StreamOptions,
    ) -> ListingResult<ArchiveReport> {
        let Self {
            archive,
            command,
            mut child,
            stdout,
        } = self;

        let sender = lines.clone();
        let (read, exit) = std::thread::scope(|scope| {
            let reader =
                scope.spawn(move || forward_lines(stdout, &sender, options.max_line_length));
            let exit = wait_for_exit(&mut child, options.timeout);
            (reader.join(), exit)
        });

        let count = match read {
            Ok(Ok(count)) => count,
            Ok(Err(ReadFailure::Io(source))) => {
                return Err(ListingError::ReadFailed {
                    command,
                    path: archive,
                    source,
                })
            }
            Ok(Err(ReadFailure::TooLong)) => {
                return Err(ListingError::LineTooLong {
                    command,
                    path: archive,
                    limit: options.max_line_length,
                })
            }
            Ok(Err(ReadFailure::Disconnected)) => {
                return Err(ListingError::Disconnected { path: archive })
            }
            Err(_) => return Err(ListingError::StreamerPanicked { path: archive }),
        };

        let outcome = match exit {
            Ok(Exit::Status(status)) if status.success() => ArchiveOutcome::Completed,
            Ok(Exit::Status(status)) => ArchiveOutcome::Failed {
                reason: describe_status(status),
            },
            Ok(Exit::TimedOut(timeout)) => ArchiveOutcome::TimedOut { timeout },
            Err(e) => ArchiveOutcome::Failed {
                reason: format!("failed to wait for process: {e}"),
            },
        };

        match &outcome {
            ArchiveOutcome::Completed => {
                debug!(archive = %archive.display(), lines = count, "Listing completed");
            }
            ArchiveOutcome::Failed { reason } => {
                warn!(
                    archive = %archive.display(),
                    command = %command,
                    lines = count,
                    "Listing failed: {reason}"
                );
            }
            ArchiveOutcome::TimedOut { timeout } => {
                warn!(
                    archive = %archive.display(),
                    command = %command,
                    lines = count,
                    "Listing killed after {timeout:?}"
                );
            }
        }

        Ok(ArchiveReport {
            archive,
            lines: count,
            outcome,
        })
    }
}

/// Read `\n`-terminated lines (a trailing `\r` is dropped) and send them downstream.
fn forward_lines(
    stdout: ChildStdout,
    lines: &SyncSender<String>,
    max_line_length: usize,
) -> Result<usize, ReadFailure> {
    let mut reader = BufReader::new(stdout);
    let mut buffer = Vec::new();
    let mut count = 0;
    // One extra byte for the terminator.
    let limit = u64::try_from(max_line_length).unwrap_or(u64::MAX).saturating_add(1);

    loop {
        buffer.clear();
        let read = reader
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut buffer)
            .map_err(ReadFailure::Io)?;
        if read == 0 {
            return Ok(count);
        }

        if buffer.last() == Some(&b'\n') {
            buffer.pop();
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }
        } else if buffer.len() > max_line_length {
            return Err(ReadFailure::TooLong);
        }

        let line = String::from_utf8_lossy(&buffer).into_owned();
        lines.send(line).map_err(|_| ReadFailure::Disconnected)?;
        count += 1;
    }
}

fn wait_for_exit(child: &mut Child, timeout: Option<Duration>) -> io::Result<Exit> {
    let Some(timeout) = timeout else {
        return child.wait().map(Exit::Status);
    };
    if let Some(status) = child.wait_timeout(timeout)? {
        return Ok(Exit::Status(status));
    }
    // Killing the process closes its end of the pipe, which unblocks the reader.
    let _ = child.kill();
    let _ = child.wait();
    Ok(Exit::TimedOut(timeout))
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("exited with non-zero status: {code}")
    } else if let Some(signal) = status.signal() {
        format!("terminated by signal: {signal}")
    } else {
        "unknown process termination".to_string()
    }
}
