//! xhep-build internal library code
//!
//! Builds the `_C` Python extension of the xhep package from its C++ sources,
//! optionally linking Pythia8, HepMC and FastJet.

pub mod config;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod paths;
pub mod platform;

// Re-export common types for convenience
pub use config::{
    BuildConfig, ConfigError, DEFAULT_COMPILE_ARGS, DEFAULT_MODULE_NAME, OptionalLibrary,
};
pub use debug::{debug_log, init_debug, is_debug_enabled};
pub use extensions::{
    BuildError, BuildReport, CxxToolchain, ExtensionBuilder, ExtensionTarget, LocalTree,
    MemoryTree, SourceSet, SourceTree, Toolchain, build_extension, clean_build_output,
    discover_sources,
};
pub use paths::{CONFIG_FILE, find_config_in};
pub use platform::PythonHost;
