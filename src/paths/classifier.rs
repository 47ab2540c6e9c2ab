// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Classifies verbose listing lines (`-rwxr-xr-x 1 root root 1234 Jan 1 2024 /usr/bin/tool`)
//! into executable or library directories.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Collapses runs of spaces before a line is split into fields.
pub const DEFAULT_SEPARATOR_PATTERN: &str = " +";

// Nominal field count; the path is the last field.
const FIELDS: usize = 9;
// Some listings drop one field, shifting the path left by one.
const DEGRADED_FIELDS: usize = FIELDS - 1;

const LIBRARY_SUFFIXES: [&str; 3] = [".o", ".a", ".so"];
const LIBRARY_INFIXES: [&str; 2] = [".so.", ".a."];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Executable,
    Library,
}

/// A containing directory and what kind of file put it there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPath {
    pub directory: String,
    pub kind: PathKind,
}

impl ClassifiedPath {
    #[must_use]
    pub fn is_library(&self) -> bool {
        self.kind == PathKind::Library
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.kind == PathKind::Executable
    }
}

/// The fields of a listing line that classification looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingEntry<'a> {
    pub permissions: &'a str,
    pub path: &'a str,
    /// The line had one field fewer than expected.
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    separator: Regex,
}

impl LineClassifier {
    #[must_use]
    pub fn new(separator: Regex) -> Self {
        Self { separator }
    }

    /// Collapse every separator run to a single space.
    #[must_use]
    pub fn normalize<'a>(&self, line: &'a str) -> std::borrow::Cow<'a, str> {
        self.separator.replace_all(line, " ")
    }

    /// Split a normalized line and pick out the permission and path fields.
    ///
    /// Returns `None` for lines with neither 9 nor 8 fields (headers, blank lines, ...).
    #[must_use]
    pub fn parse_entry<'a>(&self, normalized: &'a str) -> Option<ListingEntry<'a>> {
        let fields: Vec<&str> = normalized.split(' ').collect();
        let degraded = match fields.len() {
            FIELDS => false,
            DEGRADED_FIELDS => true,
            _ => return None,
        };
        Some(ListingEntry {
            permissions: fields[0],
            path: fields[fields.len() - 1],
            degraded,
        })
    }

    /// Classify one raw listing line.
    ///
    /// A library path always wins over the executable bit.
    #[must_use]
    pub fn classify(&self, line: &str) -> Option<ClassifiedPath> {
        let normalized = self.normalize(line);
        let entry = self.parse_entry(&normalized)?;
        if entry.degraded {
            warn_degraded(&normalized);
        }
        classify_entry(&entry)
    }
}

pub(crate) fn warn_degraded(line: &str) {
    warn!(line, "Listing line is missing a field");
}

impl Default for LineClassifier {
    fn default() -> Self {
        // We're ok with unwrapping here, the default pattern is a constant that always compiles.
        Self::new(Regex::new(DEFAULT_SEPARATOR_PATTERN).unwrap())
    }
}

/// Classify already-extracted fields.
#[must_use]
pub fn classify_entry(entry: &ListingEntry<'_>) -> Option<ClassifiedPath> {
    let kind = if is_library(entry.path) {
        PathKind::Library
    } else if is_executable(entry.permissions) {
        PathKind::Executable
    } else {
        return None;
    };
    Some(ClassifiedPath {
        directory: containing_directory(entry.path).to_string(),
        kind,
    })
}

/// Owner execute bit set and not a directory entry.
#[must_use]
pub fn is_executable(permissions: &str) -> bool {
    let bytes = permissions.as_bytes();
    bytes.get(3) == Some(&b'x') && bytes.first() != Some(&b'd')
}

/// Object files, static archives and (versioned) shared objects.
#[must_use]
pub fn is_library(path: &str) -> bool {
    LIBRARY_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
        || LIBRARY_INFIXES.iter().any(|infix| path.contains(infix))
}

/// Everything before the last `/`, or the whole path when there is none.
#[must_use]
pub fn containing_directory(path: &str) -> &str {
    path.rfind('/').map_or(path, |index| &path[..index])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXECUTABLE_LINE: &str =
        "-rwxr-xr-x    1 root    root     10240 Mar  3  2021 /usr/bin/tool";
    const LIBRARY_LINE: &str =
        "-rwxr-xr-x    1 root    root     81920 Mar  3  2021 /usr/lib64/libfoo.so.1.2";

    fn classify(line: &str) -> Option<ClassifiedPath> {
        LineClassifier::default().classify(line)
    }

    #[test]
    fn test_executable_line() {
        assert_eq!(
            classify(EXECUTABLE_LINE),
            Some(ClassifiedPath {
                directory: "/usr/bin".to_string(),
                kind: PathKind::Executable,
            })
        );
    }

    #[test]
    fn test_library_wins_over_executable_bit() {
        let path = classify(LIBRARY_LINE).unwrap();
        assert!(path.is_library());
        assert!(!path.is_executable());
        assert_eq!(path.directory, "/usr/lib64");
    }

    #[test]
    fn test_library_without_execute_bit() {
        let path = classify("-rw-r--r-- 1 root root 5 Mar 3 2021 /usr/lib/libx.a").unwrap();
        assert_eq!(path.kind, PathKind::Library);
        assert_eq!(path.directory, "/usr/lib");
    }

    #[test]
    fn test_plain_file_is_irrelevant() {
        assert_eq!(classify("-rw-r--r-- 1 root root 5 Mar 3 2021 /etc/tool.conf"), None);
    }

    #[test]
    fn test_directory_entry_is_irrelevant() {
        assert_eq!(classify("drwxr-xr-x 2 root root 0 Mar 3 2021 /usr/bin"), None);
    }

    #[test]
    fn test_degraded_line_uses_last_field() {
        // Month and day merged into one field.
        let line = "-rwxr-xr-x 1 root root 10240 Mar-3 2021 /opt/app/bin/run";
        let classifier = LineClassifier::default();
        let normalized = classifier.normalize(line);
        let entry = classifier.parse_entry(&normalized).unwrap();
        assert!(entry.degraded);
        assert_eq!(entry.path, "/opt/app/bin/run");
        assert_eq!(classify(line).unwrap().directory, "/opt/app/bin");
    }

    #[test]
    fn test_other_field_counts_are_irrelevant() {
        let classifier = LineClassifier::default();
        assert_eq!(classifier.parse_entry("-rwxr-xr-x 1 root root 1 /usr/bin/x"), None);
        assert_eq!(classifier.parse_entry("(contains no files)"), None);
        assert_eq!(classifier.parse_entry(""), None);
        assert_eq!(
            classifier.parse_entry("-rwxr-xr-x 1 root root 1 Mar 3 2021 /usr/bin/x extra"),
            None
        );
    }

    #[test]
    fn test_normalize_collapses_spaces_only() {
        let classifier = LineClassifier::default();
        assert_eq!(classifier.normalize("a   b  c"), "a b c");
        assert_eq!(classifier.normalize("a\t\tb"), "a\t\tb");
    }

    #[test]
    fn test_custom_separator_pattern() {
        let classifier = LineClassifier::new(Regex::new(r"[ \t]+").unwrap());
        let line = "-rwxr-xr-x\t1 root root 1 Mar 3 2021\t/usr/sbin/daemon";
        assert_eq!(classifier.classify(line).unwrap().directory, "/usr/sbin");
    }

    #[test]
    fn test_is_executable() {
        assert!(is_executable("-rwxr-xr-x"));
        assert!(is_executable("lrwxrwxrwx"));
        assert!(!is_executable("drwxr-xr-x"));
        assert!(!is_executable("-rw-r-xr-x"));
        assert!(!is_executable("-rw"));
        assert!(!is_executable(""));
    }

    #[test]
    fn test_is_library() {
        for path in [
            "/usr/lib/libfoo.so",
            "/usr/lib/libfoo.a",
            "/usr/lib/crt1.o",
            "/usr/lib/libfoo.so.1",
            "/usr/lib/libfoo.so.1.2.3",
            "/usr/lib/libbar.a.1",
        ] {
            assert!(is_library(path), "{path} should be a library");
        }
        for path in ["/usr/bin/tool", "/usr/share/doc/README", "/usr/lib/python3/site.py"] {
            assert!(!is_library(path), "{path} should not be a library");
        }
    }

    #[test]
    fn test_containing_directory() {
        assert_eq!(containing_directory("/usr/lib64/libfoo.so.1.2"), "/usr/lib64");
        assert_eq!(containing_directory("foo"), "foo");
        assert_eq!(containing_directory("/tool"), "");
    }
}
