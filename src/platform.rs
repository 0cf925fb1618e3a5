//! Python host detection
//!
//! An extension module has to match the interpreter that imports it: its
//! headers, its file suffix (`.cpython-311-x86_64-linux-gnu.so`) and the
//! `build/lib.<platform>-<tag>` layout the Python build tools use. All of that
//! is read from `sysconfig` once per process.

use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

/// Cached host detection (computed once, reused throughout execution)
static CURRENT_HOST: LazyLock<PythonHost> = LazyLock::new(detect_host_impl);

const SYSCONFIG_QUERY: &str = "import sys, sysconfig
print(sysconfig.get_paths()['include'])
print(sysconfig.get_config_var('EXT_SUFFIX') or '')
print(sysconfig.get_platform())
print(sys.implementation.cache_tag)";

/// What the target Python interpreter expects from an extension module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonHost {
    /// Interpreter that answered the query, `None` for the fallback
    pub interpreter: Option<String>,
    /// Directory containing `Python.h`
    pub include_dir: Option<PathBuf>,
    /// File suffix of an importable extension, e.g. `.cpython-311-x86_64-linux-gnu.so`
    pub ext_suffix: String,
    /// Build platform, e.g. `linux-x86_64`
    pub platform: String,
    /// Implementation cache tag, e.g. `cpython-311`
    pub cache_tag: String,
}

impl PythonHost {
    /// Detect the current Python host (cached after the first call).
    #[must_use]
    pub fn current() -> Self {
        CURRENT_HOST.clone()
    }

    /// Ask one interpreter for its build configuration.
    #[must_use]
    pub fn query(python: &str) -> Option<Self> {
        let output = Command::new(python)
            .args(["-c", SYSCONFIG_QUERY])
            .output()
            .ok()?;

        output.status.success().then_some(())?;

        let stdout = String::from_utf8(output.stdout).ok()?;
        let mut host = Self::parse_sysconfig(&stdout)?;
        host.interpreter = Some(python.to_string());
        Some(host)
    }

    /// Parse the four-line answer of the `sysconfig` query.
    #[must_use]
    pub fn parse_sysconfig(stdout: &str) -> Option<Self> {
        let mut lines = stdout.lines().map(str::trim);

        let include = lines.next()?;
        let suffix = lines.next()?;
        let platform = lines.next()?;
        let cache_tag = lines.next()?;

        if platform.is_empty() || cache_tag.is_empty() {
            return None;
        }

        Some(Self {
            interpreter: None,
            include_dir: (!include.is_empty()).then(|| PathBuf::from(include)),
            ext_suffix: if suffix.is_empty() {
                default_ext_suffix().to_string()
            } else {
                suffix.to_string()
            },
            platform: platform.to_string(),
            cache_tag: cache_tag.to_string(),
        })
    }

    /// Host description derived from the Rust target when no Python answers
    #[must_use]
    pub fn fallback() -> Self {
        let os = match env::consts::OS {
            "macos" => "macosx",
            "windows" => "win",
            other => other,
        };

        Self {
            interpreter: None,
            include_dir: None,
            ext_suffix: default_ext_suffix().to_string(),
            platform: format!("{os}-{}", env::consts::ARCH),
            cache_tag: "native".to_string(),
        }
    }

    /// `<platform>-<cache_tag>`, the suffix of the staging directories
    #[must_use]
    pub fn build_tag(&self) -> String {
        format!("{}-{}", self.platform, self.cache_tag)
    }

    /// Directory (relative to the build dir) receiving the linked module
    #[must_use]
    pub fn lib_dir_name(&self) -> String {
        format!("lib.{}", self.build_tag())
    }

    /// Directory (relative to the build dir) receiving object files
    #[must_use]
    pub fn temp_dir_name(&self) -> String {
        format!("temp.{}", self.build_tag())
    }

    /// File name of the compiled module
    #[must_use]
    pub fn artifact_name(&self, module_name: &str) -> String {
        format!("{module_name}{}", self.ext_suffix)
    }
}

const fn default_ext_suffix() -> &'static str {
    if cfg!(windows) { ".pyd" } else { ".so" }
}

/// Interpreters tried in order: `PYTHON`, then `python3`, then `python`
fn candidate_interpreters() -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(python) = crate::env_vars::python() {
        candidates.push(python);
    }
    candidates.push("python3".to_string());
    candidates.push("python".to_string());
    candidates
}

/// Internal implementation of host detection (called once by `LazyLock`)
fn detect_host_impl() -> PythonHost {
    for python in candidate_interpreters() {
        if let Some(host) = PythonHost::query(&python) {
            crate::debug!("python host from {python}: {}", host.build_tag());
            return host;
        }
    }

    let host = PythonHost::fallback();
    crate::debug!("no python interpreter found, using {}", host.build_tag());
    host
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;

    #[test]
    fn parses_sysconfig_answer() {
        let stdout = "/usr/include/python3.11\n\
                      .cpython-311-x86_64-linux-gnu.so\n\
                      linux-x86_64\n\
                      cpython-311\n";
        let host = PythonHost::parse_sysconfig(stdout).unwrap();

        assert_eq!(host.include_dir, Some(PathBuf::from("/usr/include/python3.11")));
        assert_eq!(host.ext_suffix, ".cpython-311-x86_64-linux-gnu.so");
        assert_eq!(host.lib_dir_name(), "lib.linux-x86_64-cpython-311");
        assert_eq!(host.temp_dir_name(), "temp.linux-x86_64-cpython-311");
        assert_eq!(
            host.artifact_name("_C"),
            "_C.cpython-311-x86_64-linux-gnu.so"
        );
    }

    #[test]
    fn empty_suffix_uses_platform_default() {
        let host = PythonHost::parse_sysconfig("/inc\n\nlinux-x86_64\ncpython-27\n").unwrap();
        assert_eq!(host.ext_suffix, default_ext_suffix());
    }

    #[test]
    fn truncated_answer_is_rejected() {
        assert!(PythonHost::parse_sysconfig("/inc\n.so\n").is_none());
        assert!(PythonHost::parse_sysconfig("").is_none());
    }

    #[test]
    fn fallback_has_no_headers() {
        let host = PythonHost::fallback();
        assert!(host.include_dir.is_none());
        assert!(host.interpreter.is_none());
        assert!(host.build_tag().ends_with("-native"));
    }

    #[test]
    fn missing_interpreter_yields_none() {
        assert!(PythonHost::query("definitely-not-a-python-xyz").is_none());
    }
}
