//! Source discovery
//!
//! Scans the configured source directories and sorts their files into
//! compiled sources (`.cpp`) and header dependencies (`.h`). Directories are
//! not descended into.

use super::error::BuildError;
use super::types::SourceSet;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Read access to the directories that hold the extension sources
pub trait SourceTree {
    /// List the direct children of `dir`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the directory does not exist, any other error when it
    /// cannot be read.
    fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;
}

/// The local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTree;

impl SourceTree for LocalTree {
    fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(SourceEntry {
                is_dir: entry.file_type()?.is_dir(),
                path: entry.path(),
            });
        }
        Ok(entries)
    }
}

/// An in-memory directory tree for exercising the pipeline without disk access
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    dirs: BTreeMap<PathBuf, Vec<SourceEntry>>,
}

impl MemoryTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directory entry as needed.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.dirs.entry(parent).or_default().push(SourceEntry {
            path,
            is_dir: false,
        });
        self
    }

    /// Add an empty directory (also listed in its parent).
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs
                .entry(parent.to_path_buf())
                .or_default()
                .push(SourceEntry {
                    path: path.clone(),
                    is_dir: true,
                });
        }
        self.dirs.entry(path).or_default();
        self
    }
}

impl SourceTree for MemoryTree {
    fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        self.dirs.get(dir).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", dir.display()),
            )
        })
    }
}

/// Discover sources and headers in every directory, in the given order.
///
/// Within one directory entries are sorted by path so compiler invocations
/// are reproducible across platforms.
///
/// # Errors
///
/// A missing or unreadable directory aborts discovery.
pub fn discover_sources(tree: &impl SourceTree, dirs: &[PathBuf]) -> Result<SourceSet, BuildError> {
    let mut found = SourceSet::default();

    for dir in dirs {
        let mut entries = tree.entries(dir).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                BuildError::MissingSourceDir { path: dir.clone() }
            } else {
                BuildError::UnreadableSourceDir {
                    path: dir.clone(),
                    source,
                }
            }
        })?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        for entry in entries.into_iter().filter(|e| !e.is_dir) {
            found.push(entry.path);
        }
    }

    crate::debug!(
        "discovered {} source(s) and {} header(s)",
        found.sources.len(),
        found.headers.len()
    );

    Ok(found)
}
