//! Extension build definitions
//!
//! The transient data of one build: what discovery found, the target handed to
//! the toolchain, and the report returned once the module is published.

use super::error::BuildError;
use crate::config::BuildConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static PYTHON_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Check that a module name can appear in `PyInit_<name>` and an `import`.
#[must_use]
pub fn is_valid_module_name(name: &str) -> bool {
    PYTHON_IDENTIFIER
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// How discovery treats a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// C++ implementation file (`.cpp`), compiled
    Source,
    /// Declaration file (`.h`), tracked as a rebuild dependency only
    Header,
    /// Anything else, ignored
    Other,
}

impl SourceKind {
    /// Classify a path by its extension (case-sensitive, like the file system).
    #[must_use]
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cpp") => Self::Source,
            Some("h") => Self::Header,
            _ => Self::Other,
        }
    }
}

/// Files found by scanning the source directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    /// `.cpp` files, compiled in this order
    pub sources: Vec<PathBuf>,
    /// `.h` files, rebuild dependencies
    pub headers: Vec<PathBuf>,
}

impl SourceSet {
    /// File every classified path into its set; others are dropped.
    pub fn push(&mut self, path: PathBuf) {
        match SourceKind::of(&path) {
            SourceKind::Source => self.sources.push(path),
            SourceKind::Header => self.headers.push(path),
            SourceKind::Other => {}
        }
    }

    /// No compilable source was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Everything the toolchain needs to produce the extension module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTarget {
    pub module_name: String,
    pub sources: Vec<PathBuf>,
    /// Headers; a change forces a rebuild but they are never compiled
    pub depends: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
}

impl ExtensionTarget {
    /// Assemble the target from the configuration and the discovered files.
    ///
    /// Enabled optional libraries append their include dir, library dir and
    /// library name after the always-present entries.
    ///
    /// # Errors
    ///
    /// Fails when the module name is not an identifier or nothing compilable
    /// was discovered.
    pub fn configure(config: &BuildConfig, found: SourceSet) -> Result<Self, BuildError> {
        if !is_valid_module_name(&config.module_name) {
            return Err(BuildError::InvalidModuleName {
                name: config.module_name.clone(),
            });
        }

        if found.is_empty() {
            return Err(BuildError::NoSources {
                dirs: config.source_paths(),
            });
        }

        let mut include_dirs: Vec<PathBuf> = config
            .include_dirs
            .iter()
            .map(|dir| absolutize(&config.resolve(dir)))
            .collect();
        let mut library_dirs: Vec<PathBuf> = config
            .library_dirs
            .iter()
            .map(|dir| absolutize(&config.resolve(dir)))
            .collect();
        let mut libraries = config.libraries.clone();

        for library in config.enabled_libraries() {
            include_dirs.push(config.resolve(&library.include_dir));
            library_dirs.push(config.resolve(&library.library_dir));
            libraries.push(library.library.clone());
        }

        Ok(Self {
            module_name: config.module_name.clone(),
            sources: found.sources,
            depends: found.headers,
            include_dirs,
            library_dirs,
            libraries,
            extra_compile_args: config.extra_compile_args.clone(),
            extra_link_args: config.extra_link_args.clone(),
        })
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Where the toolchain stages its output for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Root of the build-output tree (`build/`)
    pub build_dir: PathBuf,
    /// Object files (`build/temp.<tag>/`)
    pub temp_dir: PathBuf,
    /// Linked module (`build/lib.<tag>/`)
    pub lib_dir: PathBuf,
    /// Full path of the module the linker writes
    pub artifact: PathBuf,
}

/// What the toolchain did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainOutput {
    /// Combined stdout and stderr of every invocation
    pub log: String,
    /// Set when the artifact was newer than every input and linking was skipped
    pub up_to_date: bool,
}

/// A module copied out of the build tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// File inside the build-output tree
    pub built: PathBuf,
    /// Copy in the publish directory
    pub published: PathBuf,
}

/// Result of a successful build
#[derive(Debug)]
pub struct BuildReport {
    /// Module identifier
    pub module_name: String,

    /// Number of compiled sources
    pub source_count: usize,

    /// Number of tracked headers
    pub header_count: usize,

    /// Optional libraries linked into the module
    pub linked_libraries: Vec<String>,

    /// The linked module and its published copy
    pub published: PublishedArtifact,

    /// Whether the prior build-output tree existed and was removed
    pub cleaned: bool,

    /// Linking was skipped because nothing changed
    pub up_to_date: bool,

    /// Build duration
    pub duration: Duration,

    /// Toolchain output (stdout + stderr)
    pub output: String,
}

impl BuildReport {
    /// Path of the published module
    #[must_use]
    pub fn artifact(&self) -> &Path {
        &self.published.published
    }
}
