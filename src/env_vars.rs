//! Toolchain and build environment variable handling.

use std::env;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| is_truthy(&s))
}

fn is_truthy(value: &str) -> bool {
    let s = value.to_lowercase();
    s == "1" || s == "true" || s == "yes"
}

/// Split a colon or space separated list, dropping empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split([':', ' ', ','])
        .filter(|s| !s.is_empty())
        .map(std::string::ToString::to_string)
        .collect()
}

// Build tools
// These mirror what distutils/sysconfig honor when compiling an extension

/// C++ compiler override (`CXX`).
pub fn cxx() -> Option<String> {
    env::var("CXX").ok().filter(|s| !s.trim().is_empty())
}

/// Extra C++ compile flags (`CXXFLAGS`), appended after the configured flags.
pub fn cxxflags() -> Option<Vec<String>> {
    env::var("CXXFLAGS")
        .ok()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
}

/// Extra linker flags (`LDFLAGS`).
pub fn ldflags() -> Option<Vec<String>> {
    env::var("LDFLAGS")
        .ok()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
}

/// Python interpreter used to query `sysconfig` (`PYTHON`).
pub fn python() -> Option<String> {
    env::var("PYTHON").ok().filter(|s| !s.trim().is_empty())
}

// xhep-build specific

/// Optional libraries to enable on top of the configuration file
/// (`XHEP_BUILD_ENABLE`, e.g. `pythia8:fastjet`).
pub fn enabled_libraries() -> Option<Vec<String>> {
    env::var("XHEP_BUILD_ENABLE").ok().map(|s| parse_list(&s))
}

/// Check if debug logging was requested through `XHEP_BUILD_DEBUG`.
pub fn debug_requested() -> bool {
    is_enabled("XHEP_BUILD_DEBUG")
}
