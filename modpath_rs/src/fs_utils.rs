//! Source access for the analyzer.
//!
//! The scanner only sees text; reading files goes through [`SourceProvider`]
//! so the whole pipeline can run against an in-memory tree in tests.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait SourceProvider {
    /// Read a file as text. Invalid UTF-8 is replaced, not rejected.
    fn read_source(&self, path: &Path) -> io::Result<String>;

    /// True when `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl SourceProvider for FsSource {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file tree keyed by absolute path.
///
/// Entries added with [`MemorySource::unreadable`] exist but fail to read.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, Option<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.insert(path.into(), Some(content.to_string()));
        self
    }

    pub fn unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into(), None);
        self
    }
}

impl SourceProvider for MemorySource {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        match self.files.get(path) {
            Some(Some(content)) => Ok(content.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "file not found")),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_and_fails() {
        let src = MemorySource::new()
            .with_file("/p/a.h", "#pragma once\n")
            .unreadable("/p/locked.h");

        assert!(src.is_file(Path::new("/p/a.h")));
        assert!(src.is_file(Path::new("/p/locked.h")));
        assert!(!src.is_file(Path::new("/p/missing.h")));
        assert_eq!(
            src.read_source(Path::new("/p/a.h")).expect("read"),
            "#pragma once\n"
        );
        assert_eq!(
            src.read_source(Path::new("/p/locked.h"))
                .expect_err("locked")
                .kind(),
            io::ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn fs_source_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("latin1.h");
        fs::write(&path, b"#define A 1\n// \xe9t\xe9\n").expect("write");

        let text = FsSource.read_source(&path).expect("read");
        assert!(text.starts_with("#define A 1"));
        assert!(FsSource.is_file(&path));
        assert!(!FsSource.is_file(dir.path()));
    }
}
