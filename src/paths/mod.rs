// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Turns listing lines into deduplicated executable and library directories.

mod aggregator;
mod classifier;
mod search_paths;

pub use aggregator::{AggregateStats, PathAggregator};
pub use classifier::{
    classify_entry, containing_directory, is_executable, is_library, ClassifiedPath,
    LineClassifier, ListingEntry, PathKind, DEFAULT_SEPARATOR_PATTERN,
};
pub use search_paths::{SearchPaths, PATH_LIST_SEPARATOR};
