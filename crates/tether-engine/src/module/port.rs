// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host port for reading module sources.

use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reads the full contents of a module given its path.
///
/// Paths arrive exactly as written in the `from` clause. Dropping the
/// returned buffer releases it.
pub trait SourceReader {
    /// Reads the source stored at `path`.
    fn read_source(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads sources from the file system.
#[derive(Debug, Clone, Default)]
pub struct FsSourceReader {
    base_dir: Option<PathBuf>,
}

impl FsSourceReader {
    /// Resolves relative paths against the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// The directory relative paths resolve against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let requested = Path::new(path);
        match &self.base_dir {
            Some(base) if requested.is_relative() => base.join(requested),
            _ => requested.to_path_buf(),
        }
    }
}

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &str) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).inspect_err(|err| {
            tracing::error!(path = %resolved.display(), %err, "failed to read module source");
        })
    }
}

/// Serves sources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceReader {
    files: FxHashMap<String, String>,
}

impl MemorySourceReader {
    /// An empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceReader for MemorySourceReader {
    fn read_source(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|source| source.as_bytes().to_vec())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no module at '{path}'")))
    }
}
