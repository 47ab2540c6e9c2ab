// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Deduplicates classified directories and forwards each one downstream once.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::mpsc::{Receiver, SyncSender};
use tracing::debug;

use super::classifier::{classify_entry, warn_degraded, ClassifiedPath, LineClassifier};

/// Counters gathered while aggregating one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub lines: usize,
    pub degraded_lines: usize,
    pub relevant_lines: usize,
    pub forwarded: usize,
}

/// Owns the set of directories seen so far in a run.
pub struct PathAggregator {
    classifier: LineClassifier,
    seen: HashSet<String>,
    stats: AggregateStats,
}

impl PathAggregator {
    #[must_use]
    pub fn new(classifier: LineClassifier) -> Self {
        Self {
            classifier,
            seen: HashSet::new(),
            stats: AggregateStats::default(),
        }
    }

    /// Classify one raw line and return it if its directory has not been seen yet.
    ///
    /// Deduplication is by directory alone: once a directory has been forwarded as an
    /// executable directory it is never forwarded again as a library directory, and vice versa.
    pub fn accept(&mut self, line: &str) -> Option<ClassifiedPath> {
        self.stats.lines += 1;
        let normalized = self.classifier.normalize(line);
        let entry = self.classifier.parse_entry(&normalized)?;
        if entry.degraded {
            self.stats.degraded_lines += 1;
            warn_degraded(&normalized);
        }

        let path = classify_entry(&entry)?;
        self.stats.relevant_lines += 1;
        if !self.seen.insert(path.directory.clone()) {
            return None;
        }
        self.stats.forwarded += 1;
        Some(path)
    }

    /// Drain `lines` until every sender is gone, forwarding new directories to `paths`.
    ///
    /// `paths` is dropped on return, which closes the result channel.
    pub fn run(
        mut self,
        lines: Receiver<String>,
        paths: SyncSender<ClassifiedPath>,
    ) -> AggregateStats {
        for line in lines {
            if let Some(path) = self.accept(&line) {
                if paths.send(path).is_err() {
                    debug!("Result channel closed, stopping aggregation");
                    break;
                }
            }
        }
        debug!(
            lines = self.stats.lines,
            forwarded = self.stats.forwarded,
            "Aggregation finished"
        );
        self.stats
    }

    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        self.stats
    }
}
