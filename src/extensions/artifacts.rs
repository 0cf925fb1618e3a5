//! Build-output housekeeping
//!
//! Removes the previous build tree before a build, then copies the linked
//! module out of `build/lib.*/` next to the application that imports it.

use super::error::BuildError;
use super::types::PublishedArtifact;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions of loadable extension modules
pub const SHARED_LIBRARY_EXTENSIONS: [&str; 4] = ["so", "pyd", "dylib", "dll"];

/// Remove the build-output tree.
///
/// Returns whether anything was removed. A missing directory is not an
/// error, so running this twice in a row is harmless.
///
/// # Errors
///
/// Any removal failure other than "not found".
pub fn clean_build_output(build_dir: &Path) -> Result<bool, BuildError> {
    match fs::remove_dir_all(build_dir) {
        Ok(()) => {
            crate::debug!("removed {}", build_dir.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            crate::debug!("nothing to clean at {}", build_dir.display());
            Ok(false)
        }
        Err(source) => Err(BuildError::Cleanup {
            path: build_dir.to_path_buf(),
            source,
        }),
    }
}

/// Find every module in `build_dir/lib.*/`, sorted by path.
///
/// Reported alongside a missing artifact; publishing never copies these.
#[must_use]
pub fn find_artifacts(build_dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(build_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| in_lib_dir(path) && is_shared_library(path))
        .collect();

    found.sort();
    found
}

fn in_lib_dir(path: &Path) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("lib."))
}

fn is_shared_library(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SHARED_LIBRARY_EXTENSIONS.contains(&e))
}

/// Name of the published copy.
///
/// With a `publish_name`, the leading module name of the file is replaced and
/// the interpreter-specific suffix is kept.
fn published_file_name(file_name: &str, module_name: &str, publish_name: Option<&str>) -> String {
    match publish_name {
        Some(new_name) => file_name
            .strip_prefix(module_name)
            .map_or_else(|| file_name.to_string(), |rest| format!("{new_name}{rest}")),
        None => file_name.to_string(),
    }
}

/// Copy the module the toolchain just linked into `publish_dir`.
///
/// Only `artifact` is published; other modules left in the build tree (an
/// older interpreter, a previous module name) are never copied. An existing
/// file at the destination is overwritten, nothing else there is touched.
///
/// # Errors
///
/// Fails if `artifact` does not exist or the copy fails.
pub fn publish_artifact(
    artifact: &Path,
    build_dir: &Path,
    publish_dir: &Path,
    module_name: &str,
    publish_name: Option<&str>,
) -> Result<PublishedArtifact, BuildError> {
    if !artifact.is_file() {
        return Err(BuildError::NoArtifact {
            path: artifact.to_path_buf(),
            found: find_artifacts(build_dir),
        });
    }

    fs::create_dir_all(publish_dir).map_err(|source| BuildError::CreateDir {
        path: publish_dir.to_path_buf(),
        source,
    })?;

    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = publish_dir.join(published_file_name(&file_name, module_name, publish_name));

    fs::copy(artifact, &target).map_err(|source| BuildError::Publish {
        from: artifact.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    crate::debug!("copied {} -> {}", artifact.display(), target.display());

    Ok(PublishedArtifact {
        built: artifact.to_path_buf(),
        published: target,
    })
}
