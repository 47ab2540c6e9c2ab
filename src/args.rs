// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use package_paths::listing::{ListingCommand, DEFAULT_MAX_LINE_LENGTH};
use package_paths::output::OutputFormat;
use package_paths::paths::DEFAULT_SEPARATOR_PATTERN;
use package_paths::pipeline::{PipelineConfig, DEFAULT_CHANNEL_CAPACITY};

#[derive(Parser)]
#[command(name = "package_paths")]
#[command(version)]
#[command(
    about = "Find executables and libraries in RPMs to populate PATH and LD_LIBRARY_PATH"
)]
pub(crate) struct Args {
    /// Package files to inspect.
    pub archives: Vec<PathBuf>,

    /// Read package files one per line from stdin instead of the command line.
    #[arg(short = 'c', long = "stdin", conflicts_with = "archives")]
    pub from_stdin: bool,

    /// Program used to list an archive's contents.
    #[arg(long, env = "PACKAGE_PATHS_COMMAND", default_value = ListingCommand::RPM_PROGRAM)]
    pub command: String,

    /// Flags passed to the listing program before the archive path.
    #[arg(
        long = "flag",
        env = "PACKAGE_PATHS_FLAGS",
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_value = ListingCommand::RPM_FLAGS
    )]
    pub flags: Vec<String>,

    /// Kill a listing process after this many seconds. Waits forever when unset.
    #[arg(long, env = "PACKAGE_PATHS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Regular expression matching the whitespace between listing fields.
    #[arg(long, default_value = DEFAULT_SEPARATOR_PATTERN, hide = true)]
    pub separator: String,

    /// Longest accepted listing line in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH, hide = true)]
    pub max_line_length: usize,

    /// Depth of the line and result channels.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY, hide = true)]
    pub channel_capacity: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Env)]
    pub format: OutputFormat,

    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub(crate) fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_command(ListingCommand::new(self.command.clone(), self.flags.clone()))
            .with_separator_pattern(self.separator.clone())
            .with_channel_capacity(self.channel_capacity, self.channel_capacity)
            .with_timeout(self.timeout.map(Duration::from_secs))
            .with_max_line_length(self.max_line_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_list_rpms() {
        let args = Args::try_parse_from(["package_paths", "a.rpm", "b.rpm"]).unwrap();
        let config = args.pipeline_config();
        assert_eq!(args.archives.len(), 2);
        assert_eq!(config.command, ListingCommand::rpm());
        assert_eq!(config.stream.timeout, None);
        assert_eq!(args.format, OutputFormat::Env);
    }

    #[test]
    fn test_custom_command_and_timeout() {
        let args = Args::try_parse_from([
            "package_paths",
            "--command",
            "dpkg-deb",
            "--flag=-c",
            "--timeout",
            "5",
            "x.deb",
        ])
        .unwrap();
        let config = args.pipeline_config();
        assert_eq!(config.command, ListingCommand::new("dpkg-deb", ["-c"]));
        assert_eq!(config.stream.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_stdin_conflicts_with_archives() {
        assert!(Args::try_parse_from(["package_paths", "-c", "a.rpm"]).is_err());
        assert!(Args::try_parse_from(["package_paths", "-c"]).unwrap().from_stdin);
    }
}
