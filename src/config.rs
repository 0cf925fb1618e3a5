//! Build configuration
//!
//! Reads `xhep-build.toml` from the project root (or a user-level file) and
//! resolves it into an explicit [`BuildConfig`]. Every setting has a default,
//! so a project without a configuration file builds the `_C` module from the
//! sources in the project root with no optional libraries linked.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default module identifier of the compiled extension
pub const DEFAULT_MODULE_NAME: &str = "_C";

/// Compiler flags the extension must be built with: debug info, C++11 and no
/// warnings about string literals converted to `char *`.
pub const DEFAULT_COMPILE_ARGS: [&str; 3] = ["-g", "--std=c++11", "-Wno-write-strings"];

/// Errors that can occur while loading or adjusting the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown optional library '{name}' (known: {known})")]
    UnknownLibrary { name: String, known: String },

    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),
}

/// An external library that can be linked into the extension
///
/// Each one contributes an include directory, a library search directory and
/// a library name, and only when enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionalLibrary {
    /// Name used on the command line (`--enable pythia8`)
    pub name: String,
    /// Header directory added with `-I`
    pub include_dir: PathBuf,
    /// Library search directory added with `-L`
    pub library_dir: PathBuf,
    /// Library linked with `-l`
    pub library: String,
    /// Whether this library takes part in the build
    #[serde(default)]
    pub enabled: bool,
}

impl OptionalLibrary {
    fn new(name: &str, prefix: &str, include: &str, lib: &str, library: &str) -> Self {
        let prefix = Path::new(prefix);
        Self {
            name: name.to_string(),
            include_dir: prefix.join(include),
            library_dir: prefix.join(lib),
            library: library.to_string(),
            enabled: false,
        }
    }

    /// The physics libraries the extension knows how to link, all disabled.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("pythia8", "/opt/hep/pythia8230", "include", "lib", "pythia8"),
            Self::new("HepMC", "/opt/hep/hepmc2.06.09", "include", "lib", "HepMC"),
            Self::new(
                "fastjet",
                "/opt/hep/fastjet-3.3.0",
                "build/include",
                "build/lib",
                "fastjet",
            ),
        ]
    }
}

/// Complete description of one extension build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project root every relative path resolves against
    #[serde(skip)]
    pub root: PathBuf,

    /// Distribution name shown in build summaries
    pub package_name: String,

    /// Distribution version shown in build summaries
    pub version: String,

    /// Extension module identifier (`PyInit_<module_name>`)
    pub module_name: String,

    /// Rename the published copy to this module name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_name: Option<String>,

    /// Directories scanned for `.cpp` sources and `.h` headers
    pub source_dirs: Vec<PathBuf>,

    /// Header search path (`-I`)
    pub include_dirs: Vec<PathBuf>,

    /// Library search path (`-L`)
    pub library_dirs: Vec<PathBuf>,

    /// Libraries always linked (`-l`)
    pub libraries: Vec<String>,

    /// Flags passed to every compile step
    pub extra_compile_args: Vec<String>,

    /// Flags passed to the link step
    pub extra_link_args: Vec<String>,

    /// Build-output directory, removed before every build
    pub build_dir: PathBuf,

    /// Directory the finished module is copied into
    pub publish_dir: PathBuf,

    /// Remove `build_dir` before building
    pub clean_before_build: bool,

    /// Optional external libraries
    pub optional_libraries: Vec<OptionalLibrary>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            package_name: "xhep".to_string(),
            version: "1.0".to_string(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
            publish_name: None,
            source_dirs: vec![PathBuf::from(".")],
            include_dirs: vec![PathBuf::from(".")],
            library_dirs: Vec::new(),
            libraries: Vec::new(),
            extra_compile_args: DEFAULT_COMPILE_ARGS.iter().map(ToString::to_string).collect(),
            extra_link_args: Vec::new(),
            build_dir: PathBuf::from("build"),
            publish_dir: PathBuf::from(".."),
            clean_before_build: true,
            optional_libraries: OptionalLibrary::defaults(),
        }
    }
}

impl BuildConfig {
    /// Default configuration rooted at `root`.
    #[must_use]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load the configuration for a project.
    ///
    /// Priority: `custom_path` -> `<root>/xhep-build.toml` ->
    /// `<root>/.xhep-build.toml` -> user config -> defaults.
    /// `XHEP_BUILD_ENABLE` is applied on top of whichever file was used.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed,
    /// or if `XHEP_BUILD_ENABLE` names an unknown library.
    pub fn load(root: &Path, custom_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = custom_path
            .map(Path::to_path_buf)
            .or_else(|| paths::find_config_in(root))
            .or_else(|| paths::user_config_file().filter(|p| p.is_file()));

        let mut config = match file {
            Some(path) => {
                crate::debug!("loading config from {}", path.display());
                Self::load_from(&path)?
            }
            None => Self::default(),
        };
        config.root = root.to_path_buf();

        if let Some(names) = crate::env_vars::enabled_libraries() {
            for name in &names {
                config.enable(name)?;
            }
        }

        Ok(config)
    }

    /// Parse a configuration file; the root is left at its default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Enable an optional library by name (case-insensitive).
    pub fn enable(&mut self, name: &str) -> Result<(), ConfigError> {
        self.set_enabled(name, true)
    }

    /// Disable an optional library by name (case-insensitive).
    pub fn disable(&mut self, name: &str) -> Result<(), ConfigError> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let known = self
            .optional_libraries
            .iter()
            .map(|lib| lib.name.clone())
            .collect::<Vec<_>>()
            .join(", ");

        let library = self
            .optional_libraries
            .iter_mut()
            .find(|lib| lib.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownLibrary {
                name: name.to_string(),
                known,
            })?;

        library.enabled = enabled;
        Ok(())
    }

    /// Optional libraries that take part in the build
    pub fn enabled_libraries(&self) -> impl Iterator<Item = &OptionalLibrary> {
        self.optional_libraries.iter().filter(|lib| lib.enabled)
    }

    /// Resolve a configured path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        paths::resolve_in(&self.root, path)
    }

    /// Absolute location of the build-output directory
    #[must_use]
    pub fn build_path(&self) -> PathBuf {
        self.resolve(&self.build_dir)
    }

    /// Absolute location of the publish directory
    #[must_use]
    pub fn publish_path(&self) -> PathBuf {
        self.resolve(&self.publish_dir)
    }

    /// Source directories resolved against the root
    #[must_use]
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.source_dirs.iter().map(|d| self.resolve(d)).collect()
    }
}
