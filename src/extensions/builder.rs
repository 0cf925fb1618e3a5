//! Extension Builder Orchestration
//!
//! Runs the build pipeline: discover sources, configure the target, clean the
//! previous build output, invoke the toolchain, publish the module. Each step
//! either succeeds or ends the run; there are no retries.

use super::artifacts::{clean_build_output, publish_artifact};
use super::cxx_extension::CxxToolchain;
use super::detector::{LocalTree, SourceTree, discover_sources};
use super::error::BuildError;
use super::types::{
    BuildLayout, BuildReport, ExtensionTarget, SourceSet, ToolchainOutput, is_valid_module_name,
};
use crate::config::BuildConfig;
use crate::debug::debug_step;
use std::path::Path;
use std::time::Instant;

/// Something that turns an [`ExtensionTarget`] into a linked module
pub trait Toolchain {
    /// Where this toolchain stages objects and the linked module.
    fn layout(&self, build_dir: &Path, module_name: &str) -> BuildLayout;

    /// Compile and link the target. Blocks until the toolchain exits.
    ///
    /// # Errors
    ///
    /// Compiler or linker failures, with the toolchain's diagnostics.
    fn build(
        &self,
        target: &ExtensionTarget,
        layout: &BuildLayout,
    ) -> Result<ToolchainOutput, BuildError>;
}

/// Extension builder coordinator
///
/// Owns the file-system view used for discovery and the toolchain used for
/// compilation, so both can be swapped out in tests.
#[derive(Debug)]
pub struct ExtensionBuilder<T = LocalTree, C = CxxToolchain> {
    /// Directory listing used for discovery
    tree: T,
    /// Compiler and linker
    toolchain: C,
    /// Enable verbose output
    verbose: bool,
}

impl ExtensionBuilder {
    /// Builder for the local file system and the native C++ toolchain.
    ///
    /// When the configuration keeps the previous build output, the toolchain
    /// skips modules that are already newer than their inputs.
    #[must_use]
    pub fn native(config: &BuildConfig, verbose: bool) -> Self {
        let toolchain = CxxToolchain::new(verbose).incremental(!config.clean_before_build);
        Self::with_parts(LocalTree, toolchain, verbose)
    }
}

impl<T: SourceTree, C: Toolchain> ExtensionBuilder<T, C> {
    /// Create a builder from explicit parts.
    #[must_use]
    pub const fn with_parts(tree: T, toolchain: C, verbose: bool) -> Self {
        Self {
            tree,
            toolchain,
            verbose,
        }
    }

    /// The toolchain this builder invokes
    pub const fn toolchain(&self) -> &C {
        &self.toolchain
    }

    /// Scan the configured source directories.
    pub fn discover(&self, config: &BuildConfig) -> Result<SourceSet, BuildError> {
        let dirs = config.source_paths();
        debug_step("discover", format_args!("{} dir(s)", dirs.len()));
        discover_sources(&self.tree, &dirs)
    }

    /// Discover and assemble the build target without touching the build tree.
    pub fn configure(&self, config: &BuildConfig) -> Result<ExtensionTarget, BuildError> {
        if let Some(name) = &config.publish_name
            && !is_valid_module_name(name)
        {
            return Err(BuildError::InvalidModuleName { name: name.clone() });
        }

        let found = self.discover(config)?;
        let target = ExtensionTarget::configure(config, found)?;
        debug_step(
            "configure",
            format_args!(
                "{} with {} source(s), libraries: {:?}",
                target.module_name,
                target.sources.len(),
                target.libraries
            ),
        );
        Ok(target)
    }

    /// Layout of the build tree for this configuration
    pub fn layout(&self, config: &BuildConfig) -> BuildLayout {
        self.toolchain.layout(&config.build_path(), &config.module_name)
    }

    /// Run the full pipeline and return what was published.
    ///
    /// # Errors
    ///
    /// The first failing step ends the build: discovery and configuration
    /// errors before anything is removed, toolchain errors after the old build
    /// tree is gone, publish errors when nothing usable was produced.
    pub fn build(&self, config: &BuildConfig) -> Result<BuildReport, BuildError> {
        let start_time = Instant::now();

        let target = self.configure(config)?;
        let layout = self.layout(config);

        let cleaned = if config.clean_before_build {
            debug_step("clean", format_args!("{}", layout.build_dir.display()));
            clean_build_output(&layout.build_dir)?
        } else {
            false
        };

        if self.verbose {
            println!(
                "Building {} ({} source(s), {} header(s))",
                target.module_name,
                target.sources.len(),
                target.depends.len()
            );
        }

        debug_step("build", format_args!("{}", layout.artifact.display()));
        let ToolchainOutput { log, up_to_date } = self.toolchain.build(&target, &layout)?;

        let publish_dir = config.publish_path();
        debug_step("publish", format_args!("{}", publish_dir.display()));
        let published = publish_artifact(
            &layout.artifact,
            &layout.build_dir,
            &publish_dir,
            &target.module_name,
            config.publish_name.as_deref(),
        )?;

        if self.verbose {
            println!(
                "  Copied extension: {} -> {}",
                published.built.display(),
                published.published.display()
            );
        }

        Ok(BuildReport {
            module_name: target.module_name,
            source_count: target.sources.len(),
            header_count: target.depends.len(),
            linked_libraries: config
                .enabled_libraries()
                .map(|lib| lib.name.clone())
                .collect(),
            published,
            cleaned,
            up_to_date,
            duration: start_time.elapsed(),
            output: log,
        })
    }
}

/// Build the configured extension with the native toolchain (convenience function)
///
/// # Example
///
/// ```no_run
/// use xhep_build::{BuildConfig, build_extension};
///
/// let config = BuildConfig::load(std::path::Path::new("csrc"), None)?;
/// let report = build_extension(&config, true)?;
/// println!("Built {} -> {}", report.module_name, report.artifact().display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_extension(config: &BuildConfig, verbose: bool) -> Result<BuildReport, BuildError> {
    ExtensionBuilder::native(config, verbose).build(config)
}
