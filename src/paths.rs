//! Path utilities for locating the build configuration file.
//! Supports both a visible (`xhep-build.toml`) and a hidden (`.xhep-build.toml`) name.

use std::path::{Path, PathBuf};

/// Visible configuration file name
pub const CONFIG_FILE: &str = "xhep-build.toml";

/// Hidden configuration file name
pub const HIDDEN_CONFIG_FILE: &str = ".xhep-build.toml";

/// Find the configuration file in `dir`, checking `xhep-build.toml` first then
/// `.xhep-build.toml`. Returns `None` if neither exists.
#[must_use]
pub fn find_config_in(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();

    let visible = dir.join(CONFIG_FILE);
    if visible.is_file() {
        return Some(visible);
    }

    let hidden = dir.join(HIDDEN_CONFIG_FILE);
    hidden.is_file().then_some(hidden)
}

/// Per-user configuration file (`$XDG_CONFIG_HOME/xhep-build/config.toml`,
/// falling back to `~/.config/xhep-build/config.toml`).
#[must_use]
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("config.toml"))
}

fn user_config_dir() -> Option<PathBuf> {
    // Check XDG_CONFIG_HOME first
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return Some(PathBuf::from(xdg_config).join("xhep-build"));
    }

    dirs::home_dir().map(|home| home.join(".config").join("xhep-build"))
}

/// Resolve `path` against `root` unless it is already absolute.
#[must_use]
pub fn resolve_in(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prefers_visible_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "").unwrap();
        fs::write(temp.path().join(HIDDEN_CONFIG_FILE), "").unwrap();

        assert_eq!(
            find_config_in(temp.path()),
            Some(temp.path().join(CONFIG_FILE))
        );
    }

    #[test]
    fn falls_back_to_hidden_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(HIDDEN_CONFIG_FILE), "").unwrap();

        assert_eq!(
            find_config_in(temp.path()),
            Some(temp.path().join(HIDDEN_CONFIG_FILE))
        );
    }

    #[test]
    fn no_config_present() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_config_in(temp.path()), None);
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/work/csrc");
        assert_eq!(
            resolve_in(root, Path::new("/opt/hep/include")),
            PathBuf::from("/opt/hep/include")
        );
        assert_eq!(resolve_in(root, Path::new("..")), root.join(".."));
    }
}
