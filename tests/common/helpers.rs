//! Shared test helpers and utilities

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A translation unit that defines an importable (empty) `_C` module
#[allow(dead_code)]
pub(crate) const MINIMAL_MODULE: &str = r#"#include <Python.h>

static PyModuleDef _CModule = {PyModuleDef_HEAD_INIT, "_C", "test module", -1, NULL};

PyMODINIT_FUNC PyInit__C(void)
{
    return PyModule_Create(&_CModule);
}
"#;

/// Path to the `xhep-build` binary built for this test run
#[allow(dead_code)]
pub(crate) fn xhep_build_binary() -> &'static str {
    env!("CARGO_BIN_EXE_xhep-build")
}

/// Create `<tmp>/csrc` holding the given files
///
/// # Returns
/// The temp dir (the publish target, one level above the project) and the
/// project root
#[allow(dead_code)]
pub(crate) fn create_project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("csrc");
    fs::create_dir_all(&root).expect("Failed to create project root");

    for (name, contents) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write project file");
    }

    (temp, root)
}
