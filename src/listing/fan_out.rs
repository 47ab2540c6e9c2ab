// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Starts one listing process per archive, all feeding a single line channel.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, SyncSender};
use std::thread::Scope;
use tracing::debug;

use super::command::ListingCommand;
use super::errors::{ListingError, ListingResult};
use super::streamer::{ArchiveReport, LineStreamer, StreamOptions};

/// List every archive concurrently, sending all output lines to `lines`.
///
/// Each streamer sends exactly one done signal. The driver waits for one signal per
/// started streamer and only then drops `lines`, so the channel closes exactly once,
/// after the last listing has finished. With no archives the channel closes immediately.
///
/// If a listing process cannot be started, no further archives are launched; the ones
/// already running are drained before the error is returned.
///
/// # Errors
/// Returns the first fatal [`ListingError`] reported by any streamer.
pub(crate) fn fan_out<'scope>(
    scope: &'scope Scope<'scope, '_>,
    command: &ListingCommand,
    archives: &[PathBuf],
    options: StreamOptions,
    lines: SyncSender<String>,
) -> ListingResult<Vec<ArchiveReport>> {
    let (done_tx, done_rx) = mpsc::channel::<ListingResult<ArchiveReport>>();

    let mut started = 0;
    let mut spawn_error = None;
    for archive in archives {
        let streamer = match LineStreamer::spawn(command, archive) {
            Ok(streamer) => streamer,
            Err(e) => {
                spawn_error = Some(e);
                break;
            }
        };
        started += 1;

        let lines = lines.clone();
        let done = done_tx.clone();
        let archive = archive.clone();
        scope.spawn(move || {
            let report = panic::catch_unwind(AssertUnwindSafe(|| streamer.stream(&lines, options)))
                .unwrap_or_else(|_| Err(ListingError::StreamerPanicked { path: archive }));
            // Release this streamer's line sender before signalling.
            drop(lines);
            let _ = done.send(report);
        });
    }
    drop(done_tx);

    debug!(started, "Waiting for listings");
    let mut reports = Vec::with_capacity(started);
    let mut first_error = None;
    for _ in 0..started {
        match done_rx.recv() {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            // Every streamer holds a done sender until it has signalled.
            Err(_) => break,
        }
    }
    drop(lines);

    match spawn_error.or(first_error) {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn listing_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn run_fan_out(
        command: &ListingCommand,
        archives: &[PathBuf],
    ) -> (ListingResult<Vec<ArchiveReport>>, Vec<String>) {
        let (tx, rx) = mpsc::sync_channel(8);
        std::thread::scope(|scope| {
            let collector = scope.spawn(move || rx.iter().collect::<Vec<_>>());
            let result = fan_out(scope, command, archives, StreamOptions::default(), tx);
            (result, collector.join().unwrap())
        })
    }

    #[test]
    fn test_zero_archives_closes_channel() {
        let (result, lines) = run_fan_out(&ListingCommand::rpm(), &[]);
        assert!(result.unwrap().is_empty());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_all_lines_from_all_archives() {
        let first = listing_file("a1\na2\n");
        let second = listing_file("b1\n");
        let archives = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let command = ListingCommand::new("cat", Vec::<String>::new());

        let (result, mut lines) = run_fan_out(&command, &archives);
        let reports = result.unwrap();
        lines.sort();
        assert_eq!(lines, ["a1", "a2", "b1"]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports.iter().map(|r| r.lines).sum::<usize>(), 3);
    }

    #[test]
    fn test_channel_closes_after_slowest_listing() {
        let first = listing_file("first\n");
        let second = listing_file("second\n");
        let archives = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let command = ListingCommand::new("sh", ["-c", "sleep 0.3; cat \"$0\""]);

        let started = std::time::Instant::now();
        let (result, lines) = run_fan_out(&command, &archives);
        assert!(result.is_ok());
        assert_eq!(lines.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_spawn_failure_is_fatal() {
        let file = listing_file("x\n");
        let command = ListingCommand::new("/nonexistent/listing-tool", Vec::<String>::new());
        let (result, lines) = run_fan_out(&command, &[file.path().to_path_buf()]);
        assert!(matches!(result, Err(ListingError::CommandNotFound { .. })));
        assert!(lines.is_empty());
    }
}
