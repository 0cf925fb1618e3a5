//! Debug logging utilities
//!
//! Debug output is switched on by the global `--debug` flag or the
//! `XHEP_BUILD_DEBUG` environment variable. Messages go to stderr so they never
//! mix with the build summary printed on stdout.

use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug mode from the command-line flag.
///
/// The environment variable can only turn debugging on, never off.
pub fn init_debug(flag: bool) {
    let enabled = flag || crate::env_vars::debug_requested();
    let _ = DEBUG_ENABLED.set(enabled);
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Print a debug message if debug mode is enabled
pub fn debug_log(message: &str) {
    if is_debug_enabled() {
        eprintln!("[DEBUG] {message}");
    }
}

/// Log one step of the build pipeline (`discover`, `clean`, ...).
pub fn debug_step(step: &str, args: std::fmt::Arguments<'_>) {
    if is_debug_enabled() {
        eprintln!("[DEBUG] {step}: {args}");
    }
}

/// Usage: `debug!("compiling {}", path.display())`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[DEBUG] {}", format_args!($($arg)*));
        }
    };
}
