//! Native extension building
//!
//! Compiles the C++ sources of the project into one Python extension module
//! and publishes it next to the package that imports it.
//!
//! Pipeline:
//! - discover `.cpp` sources and `.h` headers ([`detector`])
//! - configure the target from [`crate::config::BuildConfig`] ([`types`])
//! - clean the previous build tree ([`artifacts`])
//! - compile and link ([`cxx_extension`])
//! - copy the module out of the build tree ([`artifacts`])

pub mod artifacts;
pub mod builder;
pub mod cxx_extension;
pub mod detector;
pub mod error;
pub mod types;

pub use artifacts::{clean_build_output, find_artifacts, publish_artifact};
pub use builder::{ExtensionBuilder, Toolchain, build_extension};
pub use cxx_extension::{CxxToolchain, Invocation};
pub use detector::{LocalTree, MemoryTree, SourceEntry, SourceTree, discover_sources};
pub use error::BuildError;
pub use types::{
    BuildLayout, BuildReport, ExtensionTarget, PublishedArtifact, SourceKind, SourceSet,
    ToolchainOutput, is_valid_module_name,
};
