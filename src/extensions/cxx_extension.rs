//! C++ extension building
//!
//! Compiles and links the extension with the system C++ compiler, laid out the
//! way the Python build tools lay it out:
//! ```bash
//! c++ -fPIC -I... -c Module.cpp -o build/temp.<tag>/Module.o -g --std=c++11 -Wno-write-strings
//! c++ -shared build/temp.<tag>/*.o -L... -l... -o build/lib.<tag>/_C<EXT_SUFFIX>
//! ```

use super::builder::Toolchain;
use super::error::BuildError;
use super::types::{BuildLayout, ExtensionTarget, ToolchainOutput};
use crate::platform::PythonHost;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::SystemTime;

/// Compilers tried when `CXX` is not set
const DEFAULT_COMPILERS: [&str; 3] = ["c++", "g++", "clang++"];

/// Compiler spawned when none was found in `PATH`
const FALLBACK_COMPILER: &str = "c++";

/// One planned compiler or linker run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    fn flag_path(&mut self, flag: &str, path: &Path) -> &mut Self {
        let mut joined = OsString::from(flag);
        joined.push(path.as_os_str());
        self.args.push(joined);
        self
    }

    /// Whether the argument list contains `arg` verbatim
    #[must_use]
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    fn run(&self) -> Result<Output, BuildError> {
        Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| BuildError::ToolchainUnavailable {
                program: self.program.clone(),
                source,
            })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Native C++ toolchain
///
/// Handles the standard extension build:
/// 1. Compile every source to an object file in `build/temp.<tag>/`
/// 2. Link the objects into `build/lib.<tag>/<module><EXT_SUFFIX>`
#[derive(Debug, Clone)]
pub struct CxxToolchain {
    /// C++ compiler, also used as the linker driver
    compiler: String,
    /// Interpreter the module is built for
    host: PythonHost,
    /// Flags from `CXXFLAGS`
    env_cxxflags: Vec<String>,
    /// Flags from `LDFLAGS`
    env_ldflags: Vec<String>,
    /// Skip linking when the module is newer than every input
    incremental: bool,
    /// Enable verbose output
    verbose: bool,
}

impl CxxToolchain {
    /// Create a toolchain for the detected Python host.
    ///
    /// Compiler priority: `CXX` environment variable, then the first of
    /// `c++`, `g++`, `clang++` found in `PATH`.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self::with_host(Self::find_compiler(), PythonHost::current(), verbose)
    }

    /// Create a toolchain with an explicit compiler and host.
    #[must_use]
    pub fn with_host(compiler: impl Into<String>, host: PythonHost, verbose: bool) -> Self {
        Self {
            compiler: compiler.into(),
            host,
            env_cxxflags: crate::env_vars::cxxflags().unwrap_or_default(),
            env_ldflags: crate::env_vars::ldflags().unwrap_or_default(),
            incremental: false,
            verbose,
        }
    }

    /// Reuse an up-to-date module instead of rebuilding it.
    #[must_use]
    pub const fn incremental(mut self, enabled: bool) -> Self {
        self.incremental = enabled;
        self
    }

    /// The compiler this toolchain runs
    #[must_use]
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// The Python host the module is built for
    #[must_use]
    pub const fn host(&self) -> &PythonHost {
        &self.host
    }

    fn find_compiler() -> String {
        if let Some(cxx) = crate::env_vars::cxx() {
            return cxx;
        }

        for candidate in DEFAULT_COMPILERS {
            if let Ok(output) = Command::new("which").arg(candidate).output()
                && output.status.success()
            {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return path;
                }
            }
        }

        // Let the first spawn report the missing compiler
        FALLBACK_COMPILER.to_string()
    }

    /// Object file for each source, unique within the temp directory
    fn object_paths(target: &ExtensionTarget, layout: &BuildLayout) -> Vec<PathBuf> {
        let mut used = HashSet::new();
        target
            .sources
            .iter()
            .map(|source| {
                let stem = source
                    .file_stem()
                    .map_or_else(|| "source".to_string(), |s| s.to_string_lossy().into_owned());
                let mut name = format!("{stem}.o");
                let mut n = 1;
                while !used.insert(name.clone()) {
                    name = format!("{stem}-{n}.o");
                    n += 1;
                }
                layout.temp_dir.join(name)
            })
            .collect()
    }

    fn compile_invocation(
        &self,
        target: &ExtensionTarget,
        source: &Path,
        object: &Path,
    ) -> Invocation {
        let mut inv = Invocation::new(&self.compiler);

        if !cfg!(windows) {
            inv.arg("-fPIC");
        }
        if let Some(include) = &self.host.include_dir {
            inv.flag_path("-I", include);
        }
        for dir in &target.include_dirs {
            inv.flag_path("-I", dir);
        }
        inv.arg("-c").arg(source).arg("-o").arg(object);
        for flag in target.extra_compile_args.iter().chain(&self.env_cxxflags) {
            inv.arg(flag);
        }

        inv
    }

    fn link_invocation(
        &self,
        target: &ExtensionTarget,
        objects: &[PathBuf],
        output: &Path,
    ) -> Invocation {
        let mut inv = Invocation::new(&self.compiler);

        inv.arg("-shared");
        if cfg!(target_os = "macos") {
            // Python symbols are resolved by the interpreter at import time
            inv.arg("-undefined").arg("dynamic_lookup");
        }
        for object in objects {
            inv.arg(object);
        }
        for dir in &target.library_dirs {
            inv.flag_path("-L", dir);
        }
        for library in &target.libraries {
            inv.arg(format!("-l{library}"));
        }
        inv.arg("-o").arg(output);
        for flag in target.extra_link_args.iter().chain(&self.env_ldflags) {
            inv.arg(flag);
        }

        inv
    }

    /// Every invocation a full build runs, compile steps first.
    #[must_use]
    pub fn plan(&self, target: &ExtensionTarget, layout: &BuildLayout) -> Vec<Invocation> {
        let objects = Self::object_paths(target, layout);
        let mut plan: Vec<Invocation> = target
            .sources
            .iter()
            .zip(&objects)
            .map(|(source, object)| self.compile_invocation(target, source, object))
            .collect();
        plan.push(self.link_invocation(target, &objects, &layout.artifact));
        plan
    }

    fn announce(&self, inv: &Invocation) {
        if self.verbose {
            println!("  Running: {inv}");
        }
        crate::debug!("{inv}");
    }
}

/// The module exists and is newer than every source and header.
fn is_up_to_date(artifact: &Path, target: &ExtensionTarget) -> bool {
    let Some(built) = modified(artifact) else {
        return false;
    };

    target
        .sources
        .iter()
        .chain(&target.depends)
        .all(|input| modified(input).is_some_and(|m| m <= built))
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_output(log: &mut String, output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    log.push_str(&stdout);
    log.push_str(&stderr);

    let mut diagnostics = stderr.into_owned();
    if diagnostics.trim().is_empty() {
        diagnostics = stdout.into_owned();
    }
    diagnostics
}

impl Toolchain for CxxToolchain {
    fn layout(&self, build_dir: &Path, module_name: &str) -> BuildLayout {
        let lib_dir = build_dir.join(self.host.lib_dir_name());
        BuildLayout {
            build_dir: build_dir.to_path_buf(),
            temp_dir: build_dir.join(self.host.temp_dir_name()),
            artifact: lib_dir.join(self.host.artifact_name(module_name)),
            lib_dir,
        }
    }

    fn build(
        &self,
        target: &ExtensionTarget,
        layout: &BuildLayout,
    ) -> Result<ToolchainOutput, BuildError> {
        let mut log = String::new();

        if self.incremental && is_up_to_date(&layout.artifact, target) {
            if self.verbose {
                println!("  {} is up to date", layout.artifact.display());
            }
            return Ok(ToolchainOutput {
                log,
                up_to_date: true,
            });
        }

        create_dir(&layout.temp_dir)?;
        create_dir(&layout.lib_dir)?;

        let objects = Self::object_paths(target, layout);

        for (source, object) in target.sources.iter().zip(&objects) {
            let inv = self.compile_invocation(target, source, object);
            self.announce(&inv);

            let output = inv.run()?;
            let diagnostics = collect_output(&mut log, &output);
            if !output.status.success() {
                return Err(BuildError::CompileFailed {
                    file: source.clone(),
                    code: output.status.code(),
                    diagnostics,
                });
            }
        }

        let inv = self.link_invocation(target, &objects, &layout.artifact);
        self.announce(&inv);

        let output = inv.run()?;
        let diagnostics = collect_output(&mut log, &output);
        if !output.status.success() {
            return Err(BuildError::LinkFailed {
                code: output.status.code(),
                diagnostics,
            });
        }

        Ok(ToolchainOutput {
            log,
            up_to_date: false,
        })
    }
}
