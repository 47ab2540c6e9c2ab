// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Wires listing, aggregation and merging into one concurrent run.
//!
//! ```text
//! archive listings (one thread each) -> lines -> aggregator -> paths -> merger
//! ```

use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::listing::{fan_out, ArchiveReport, ListingCommand, ListingError, StreamOptions};
use crate::paths::{
    AggregateStats, LineClassifier, PathAggregator, SearchPaths, DEFAULT_SEPARATOR_PATTERN,
};

/// Default depth of the line and result channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 200;

/// Result type for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid separator pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Channel capacity must be greater than zero")]
    ZeroCapacity,
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error("Pipeline worker panicked: {worker}")]
    WorkerPanicked { worker: &'static str },
}

/// Everything a run can be tuned with. No state is shared between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub command: ListingCommand,
    pub separator_pattern: String,
    pub line_capacity: usize,
    pub path_capacity: usize,
    pub stream: StreamOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            command: ListingCommand::default(),
            separator_pattern: DEFAULT_SEPARATOR_PATTERN.to_string(),
            line_capacity: DEFAULT_CHANNEL_CAPACITY,
            path_capacity: DEFAULT_CHANNEL_CAPACITY,
            stream: StreamOptions::default(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_command(mut self, command: ListingCommand) -> Self {
        self.command = command;
        self
    }

    #[must_use]
    pub fn with_separator_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.separator_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_channel_capacity(mut self, lines: usize, paths: usize) -> Self {
        self.line_capacity = lines;
        self.path_capacity = paths;
        self
    }

    /// Bound how long each listing process may run. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.stream.max_line_length = max_line_length;
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub search_paths: SearchPaths,
    pub archives: Vec<ArchiveReport>,
    pub stats: AggregateStats,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    classifier: LineClassifier,
}

impl Pipeline {
    /// Create a pipeline from a configuration.
    ///
    /// # Errors
    /// Returns an error if the separator pattern does not compile or a channel has no capacity.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        if config.line_capacity == 0 || config.path_capacity == 0 {
            return Err(PipelineError::ZeroCapacity);
        }
        let separator = regex::Regex::new(&config.separator_pattern).map_err(|e| {
            PipelineError::InvalidPattern {
                pattern: config.separator_pattern.clone(),
                source: e,
            }
        })?;
        Ok(Self {
            config,
            classifier: LineClassifier::new(separator),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// List all archives concurrently and collect their executable and library directories.
    ///
    /// The aggregator and merger each run on their own thread; the calling thread drives the
    /// listing processes. Results are only returned once every listing has finished.
    ///
    /// # Errors
    /// Returns an error if any listing process cannot be started or its output cannot be read.
    pub fn run(&self, archives: &[PathBuf]) -> PipelineResult<PipelineOutput> {
        info!(archives = archives.len(), command = %self.config.command, "Collecting search paths");

        let (line_tx, line_rx) = mpsc::sync_channel(self.config.line_capacity);
        let (path_tx, path_rx) = mpsc::sync_channel(self.config.path_capacity);
        let aggregator = PathAggregator::new(self.classifier.clone());

        let (listed, stats, search_paths) = std::thread::scope(|scope| {
            let aggregate = scope.spawn(move || aggregator.run(line_rx, path_tx));
            let merge = scope.spawn(move || SearchPaths::collect(path_rx));
            let listed = fan_out(
                scope,
                &self.config.command,
                archives,
                self.config.stream,
                line_tx,
            );
            (listed, aggregate.join(), merge.join())
        });

        let archives = listed?;
        let stats = stats.map_err(|_| PipelineError::WorkerPanicked { worker: "aggregator" })?;
        let search_paths =
            search_paths.map_err(|_| PipelineError::WorkerPanicked { worker: "merger" })?;

        info!(
            executables = search_paths.executables().len(),
            libraries = search_paths.libraries().len(),
            lines = stats.lines,
            "Search paths collected"
        );
        Ok(PipelineOutput {
            search_paths,
            archives,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.command, ListingCommand::rpm());
        assert_eq!(config.separator_pattern, " +");
        assert_eq!(config.line_capacity, 200);
        assert_eq!(config.stream.timeout, None);
    }

    #[test]
    fn test_invalid_pattern() {
        let config = PipelineConfig::default().with_separator_pattern("(");
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_zero_capacity() {
        let config = PipelineConfig::default().with_channel_capacity(0, 10);
        assert!(matches!(Pipeline::new(config), Err(PipelineError::ZeroCapacity)));
    }

    #[test]
    fn test_no_archives_yields_empty_paths() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let output = pipeline.run(&[]).unwrap();
        assert!(output.search_paths.is_empty());
        assert!(output.archives.is_empty());
        assert_eq!(output.stats, AggregateStats::default());
    }
}
