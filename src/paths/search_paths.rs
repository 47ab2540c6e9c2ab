// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Splits deduplicated directories into `PATH` and `LD_LIBRARY_PATH` entries.

use serde::Serialize;
use std::sync::mpsc::Receiver;

use super::classifier::{ClassifiedPath, PathKind};

/// Separator used when joining search path entries.
pub const PATH_LIST_SEPARATOR: &str = ":";

/// Executable and library directories, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPaths {
    executables: Vec<String>,
    libraries: Vec<String>,
}

impl SearchPaths {
    /// Drain the result channel until it closes.
    #[must_use]
    pub fn collect(paths: Receiver<ClassifiedPath>) -> Self {
        paths.into_iter().collect()
    }

    pub fn push(&mut self, path: ClassifiedPath) {
        match path.kind {
            PathKind::Library => self.libraries.push(path.directory),
            PathKind::Executable => self.executables.push(path.directory),
        }
    }

    #[must_use]
    pub fn executables(&self) -> &[String] {
        &self.executables
    }

    #[must_use]
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executables.is_empty() && self.libraries.is_empty()
    }

    /// Executable directories joined for `PATH`.
    #[must_use]
    pub fn path(&self) -> String {
        self.executables.join(PATH_LIST_SEPARATOR)
    }

    /// Library directories joined for `LD_LIBRARY_PATH`.
    #[must_use]
    pub fn ld_library_path(&self) -> String {
        self.libraries.join(PATH_LIST_SEPARATOR)
    }
}

impl FromIterator<ClassifiedPath> for SearchPaths {
    fn from_iter<I: IntoIterator<Item = ClassifiedPath>>(iter: I) -> Self {
        let mut search_paths = Self::default();
        for path in iter {
            search_paths.push(path);
        }
        search_paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn classified(directory: &str, kind: PathKind) -> ClassifiedPath {
        ClassifiedPath {
            directory: directory.to_string(),
            kind,
        }
    }

    #[test]
    fn test_empty() {
        let search_paths = SearchPaths::default();
        assert!(search_paths.is_empty());
        assert_eq!(search_paths.path(), "");
        assert_eq!(search_paths.ld_library_path(), "");
    }

    #[test]
    fn test_partition_preserves_order() {
        let search_paths: SearchPaths = [
            classified("/usr/bin", PathKind::Executable),
            classified("/usr/lib64", PathKind::Library),
            classified("/opt/app/bin", PathKind::Executable),
            classified("/opt/app/lib", PathKind::Library),
        ]
        .into_iter()
        .collect();
        assert_eq!(search_paths.path(), "/usr/bin:/opt/app/bin");
        assert_eq!(search_paths.ld_library_path(), "/usr/lib64:/opt/app/lib");
    }

    #[test]
    fn test_collect_from_closed_channel() {
        let (tx, rx) = mpsc::sync_channel(4);
        tx.send(classified("/usr/sbin", PathKind::Executable)).unwrap();
        drop(tx);
        let search_paths = SearchPaths::collect(rx);
        assert_eq!(search_paths.executables(), ["/usr/sbin".to_string()]);
        assert!(search_paths.libraries().is_empty());
    }
}
