// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Lists archive contents by running an external inspection command per archive and
//! streaming its output lines concurrently into one channel.

mod command;
mod errors;
mod fan_out;
mod streamer;

pub use command::ListingCommand;
pub use errors::{ListingError, ListingResult};
pub(crate) use fan_out::fan_out;
pub use streamer::{ArchiveOutcome, ArchiveReport, StreamOptions, DEFAULT_MAX_LINE_LENGTH};
