//! Extension build errors
//!
//! Every failure of the discover → configure → clean → build → publish
//! pipeline is terminal for the run. Toolchain failures carry the compiler's
//! own diagnostics so the caller can surface them unchanged.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building an extension module
#[derive(Debug, Error)]
pub enum BuildError {
    /// A configured source directory does not exist
    #[error("Source directory not found: {}", path.display())]
    MissingSourceDir { path: PathBuf },

    /// A configured source directory exists but cannot be listed
    #[error("Failed to read source directory: {}", path.display())]
    UnreadableSourceDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Discovery finished without a single compilable source
    #[error("No .cpp sources found in: {}", join_paths(dirs))]
    NoSources { dirs: Vec<PathBuf> },

    /// The module (or publish) name is not a valid Python identifier
    #[error("Invalid module name '{name}': must be a valid Python identifier")]
    InvalidModuleName { name: String },

    /// Removing the previous build output failed for a reason other than absence
    #[error("Failed to remove build directory: {}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A staging directory for the build could not be created
    #[error("Failed to create directory: {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compiler (or the Python interpreter) could not be started
    #[error("Failed to run {program}")]
    ToolchainUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Compiling one translation unit failed
    #[error("Compiling {} failed ({}):\n{diagnostics}", file.display(), exit_label(*code))]
    CompileFailed {
        file: PathBuf,
        code: Option<i32>,
        diagnostics: String,
    },

    /// Linking the shared library failed (unresolved symbol, missing library)
    #[error("Linking failed ({}):\n{diagnostics}", exit_label(*code))]
    LinkFailed {
        code: Option<i32>,
        diagnostics: String,
    },

    /// The build reported success but the linked module is not where the
    /// toolchain said it would be
    #[error("No compiled extension found at {}{}", path.display(), other_modules(found))]
    NoArtifact { path: PathBuf, found: Vec<PathBuf> },

    /// Copying the artifact into the publish directory failed
    #[error("Failed to copy {} to {}", from.display(), to.display())]
    Publish {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Compiler or linker output attached to a toolchain failure
    #[must_use]
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::CompileFailed { diagnostics, .. } | Self::LinkFailed { diagnostics, .. } => {
                Some(diagnostics)
            }
            _ => None,
        }
    }

    /// Whether the failure happened before the toolchain was ever invoked
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSourceDir { .. }
                | Self::UnreadableSourceDir { .. }
                | Self::NoSources { .. }
                | Self::InvalidModuleName { .. }
        )
    }
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |c| format!("exit code {c}"),
    )
}

fn other_modules(found: &[PathBuf]) -> String {
    if found.is_empty() {
        String::new()
    } else {
        format!(" (build tree holds: {})", join_paths(found))
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
