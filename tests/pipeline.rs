mod common;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use xhep_build::extensions::{BuildLayout, ToolchainOutput};
use xhep_build::{
    BuildConfig, BuildError, ExtensionBuilder, ExtensionTarget, LocalTree, MemoryTree, Toolchain,
    clean_build_output, discover_sources,
};

use common::create_project;

/// Stands in for the compiler: records each target and writes a fake module,
/// or fails the way a real compiler/linker would.
#[derive(Debug, Default)]
struct RecordingToolchain {
    outcome: Outcome,
    targets: RefCell<Vec<ExtensionTarget>>,
}

#[derive(Debug, Default, Clone, Copy)]
enum Outcome {
    #[default]
    Link,
    SyntaxError,
    MissingLibrary,
    NoOutput,
}

impl RecordingToolchain {
    fn failing(outcome: Outcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }
}

impl Toolchain for RecordingToolchain {
    fn layout(&self, build_dir: &Path, module_name: &str) -> BuildLayout {
        let lib_dir = build_dir.join("lib.linux-x86_64-cpython-311");
        BuildLayout {
            build_dir: build_dir.to_path_buf(),
            temp_dir: build_dir.join("temp.linux-x86_64-cpython-311"),
            artifact: lib_dir.join(format!("{module_name}.cpython-311-x86_64-linux-gnu.so")),
            lib_dir,
        }
    }

    fn build(
        &self,
        target: &ExtensionTarget,
        layout: &BuildLayout,
    ) -> Result<ToolchainOutput, BuildError> {
        self.targets.borrow_mut().push(target.clone());

        match self.outcome {
            Outcome::Link => {
                fs::create_dir_all(&layout.lib_dir).unwrap();
                fs::write(&layout.artifact, b"\x7fELF").unwrap();
                Ok(ToolchainOutput {
                    log: "linked".to_string(),
                    up_to_date: false,
                })
            }
            Outcome::SyntaxError => Err(BuildError::CompileFailed {
                file: target.sources.first().cloned().unwrap_or_default(),
                code: Some(1),
                diagnostics: "Module.cpp:1:5: error: expected ';' before '}' token".to_string(),
            }),
            Outcome::MissingLibrary => Err(BuildError::LinkFailed {
                code: Some(1),
                diagnostics: format!("/usr/bin/ld: cannot find -l{}", target.libraries.join(" -l")),
            }),
            Outcome::NoOutput => Ok(ToolchainOutput::default()),
        }
    }
}

fn builder(toolchain: RecordingToolchain) -> ExtensionBuilder<LocalTree, RecordingToolchain> {
    ExtensionBuilder::with_parts(LocalTree, toolchain, false)
}

const PUBLISHED: &str = "_C.cpython-311-x86_64-linux-gnu.so";

#[test]
fn counts_sources_and_headers_regardless_of_other_files() {
    let (_temp, root) = create_project(&[
        ("Module.cpp", ""),
        ("Vec4.cpp", ""),
        ("utils.cpp", ""),
        ("Vec4.h", ""),
        ("utils.h", ""),
        ("setup.py", ""),
        ("Vec4.o", ""),
        ("notes.md", ""),
    ]);

    let found = discover_sources(&LocalTree, &[root]).unwrap();

    assert_eq!(found.sources.len(), 3);
    assert_eq!(found.headers.len(), 2);
}

#[test]
fn single_source_publishes_one_module_in_parent() {
    let (temp, root) = create_project(&[("Module.cpp", "")]);
    let config = BuildConfig::for_root(&root);

    let report = builder(RecordingToolchain::default()).build(&config).unwrap();

    assert_eq!(report.artifact(), root.join("..").join(PUBLISHED));
    assert!(temp.path().join(PUBLISHED).is_file());
    assert!(report.linked_libraries.is_empty());
    assert_eq!(report.output, "linked");
}

#[test]
fn target_carries_reference_flags_and_headers_as_dependencies() {
    let (_temp, root) = create_project(&[("Module.cpp", ""), ("Vec4.h", ""), ("utils.h", "")]);
    let config = BuildConfig::for_root(&root);
    let builder = builder(RecordingToolchain::default());

    builder.build(&config).unwrap();

    let targets = builder.toolchain().targets.borrow();
    let target = targets.first().unwrap();
    assert_eq!(target.module_name, "_C");
    assert_eq!(target.sources, vec![root.join("Module.cpp")]);
    assert_eq!(target.depends.len(), 2);
    assert_eq!(
        target.extra_compile_args,
        vec!["-g", "--std=c++11", "-Wno-write-strings"]
    );
    assert!(target.libraries.is_empty());
    assert!(target.library_dirs.is_empty());
    assert_eq!(target.include_dirs.len(), 1);
    assert!(target.include_dirs.iter().all(|d| d.is_absolute()));
}

#[test]
fn empty_project_fails_before_building() {
    let (temp, root) = create_project(&[("README", ""), ("utils.h", "")]);
    let config = BuildConfig::for_root(&root);
    let builder = builder(RecordingToolchain::default());

    let err = builder.build(&config).unwrap_err();

    assert!(matches!(err, BuildError::NoSources { .. }));
    assert!(builder.toolchain().targets.borrow().is_empty());
    assert!(!temp.path().join(PUBLISHED).exists());
}

#[test]
fn missing_source_directory_is_fatal() {
    let (_temp, root) = create_project(&[("Module.cpp", "")]);
    let mut config = BuildConfig::for_root(&root);
    config.source_dirs.push(PathBuf::from("missing"));

    let err = builder(RecordingToolchain::default()).build(&config).unwrap_err();

    assert!(matches!(err, BuildError::MissingSourceDir { path } if path == root.join("missing")));
}

#[test]
fn syntax_error_keeps_previous_published_module() {
    let (temp, root) = create_project(&[("Module.cpp", "int main( {")]);
    let config = BuildConfig::for_root(&root);

    builder(RecordingToolchain::default()).build(&config).unwrap();
    let published = temp.path().join(PUBLISHED);
    fs::write(&published, b"previous good build").unwrap();

    let err = builder(RecordingToolchain::failing(Outcome::SyntaxError))
        .build(&config)
        .unwrap_err();

    assert!(matches!(err, BuildError::CompileFailed { .. }));
    assert!(err.to_string().contains("expected ';'"));
    assert_eq!(fs::read(&published).unwrap(), b"previous good build");
    assert!(!config.build_path().exists(), "cleanup runs before the build");
}

#[test]
fn enabled_library_missing_from_library_dir_fails_to_link() {
    let (temp, root) = create_project(&[("Module.cpp", "")]);
    let mut config = BuildConfig::for_root(&root);
    config.enable("fastjet").unwrap();
    let builder = builder(RecordingToolchain::failing(Outcome::MissingLibrary));

    let err = builder.build(&config).unwrap_err();

    assert!(matches!(err, BuildError::LinkFailed { .. }));
    assert!(err.diagnostics().unwrap().contains("-lfastjet"));
    assert!(!temp.path().join(PUBLISHED).exists());

    let targets = builder.toolchain().targets.borrow();
    assert_eq!(targets.first().unwrap().libraries, vec!["fastjet"]);
}

#[test]
fn silent_toolchain_without_module_is_a_publish_error() {
    let (_temp, root) = create_project(&[("Module.cpp", "")]);
    let config = BuildConfig::for_root(&root);

    let err = builder(RecordingToolchain::failing(Outcome::NoOutput))
        .build(&config)
        .unwrap_err();

    assert!(matches!(err, BuildError::NoArtifact { .. }));
}

#[test]
fn cleaning_twice_does_not_change_the_outcome() {
    let (temp, root) = create_project(&[("Module.cpp", "")]);
    let config = BuildConfig::for_root(&root);

    builder(RecordingToolchain::default()).build(&config).unwrap();
    assert!(clean_build_output(&config.build_path()).unwrap());
    assert!(!clean_build_output(&config.build_path()).unwrap());

    let report = builder(RecordingToolchain::default()).build(&config).unwrap();

    assert!(!report.cleaned);
    assert!(temp.path().join(PUBLISHED).is_file());
}

#[test]
fn kept_build_tree_is_not_removed() {
    let (_temp, root) = create_project(&[("Module.cpp", "")]);
    let mut config = BuildConfig::for_root(&root);
    config.clean_before_build = false;
    let marker = config.build_path().join("keep.txt");
    fs::create_dir_all(config.build_path()).unwrap();
    fs::write(&marker, "").unwrap();

    let report = builder(RecordingToolchain::default()).build(&config).unwrap();

    assert!(!report.cleaned);
    assert!(marker.exists());
}

#[test]
fn kept_build_tree_publishes_only_the_new_module() {
    let (temp, root) = create_project(&[("Module.cpp", "")]);
    let mut config = BuildConfig::for_root(&root);
    config.clean_before_build = false;
    let older = config.build_path().join("lib.linux-x86_64-cpython-310");
    fs::create_dir_all(&older).unwrap();
    fs::write(older.join("_C.cpython-310-x86_64-linux-gnu.so"), b"old interpreter").unwrap();
    fs::write(older.join("_old.so"), b"old module name").unwrap();

    let report = builder(RecordingToolchain::default()).build(&config).unwrap();

    assert_eq!(report.artifact(), root.join("..").join(PUBLISHED));
    let mut published: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| name != "csrc")
        .collect();
    published.sort();
    assert_eq!(published, vec![PUBLISHED]);
}

#[test]
fn publish_name_renames_the_copy() {
    let (temp, root) = create_project(&[("Module.cpp", "")]);
    let mut config = BuildConfig::for_root(&root);
    config.publish_name = Some("_xhep".to_string());

    builder(RecordingToolchain::default()).build(&config).unwrap();

    assert!(temp.path().join("_xhep.cpython-311-x86_64-linux-gnu.so").is_file());
    assert!(!temp.path().join(PUBLISHED).exists());
}

#[test]
fn in_memory_tree_configures_without_disk() {
    let mut config = BuildConfig::for_root("/virtual/csrc");
    config.source_dirs = vec![PathBuf::from("src"), PathBuf::from("extra")];
    let tree = MemoryTree::new()
        .with_file("/virtual/csrc/src/Module.cpp")
        .with_file("/virtual/csrc/src/Vec4.h")
        .with_file("/virtual/csrc/extra/Vec4.cpp")
        .with_file("/virtual/csrc/extra/build.sh");
    let builder = ExtensionBuilder::with_parts(tree, RecordingToolchain::default(), false);

    let target = builder.configure(&config).unwrap();

    assert_eq!(
        target.sources,
        vec![
            PathBuf::from("/virtual/csrc/src/Module.cpp"),
            PathBuf::from("/virtual/csrc/extra/Vec4.cpp"),
        ]
    );
    assert_eq!(target.depends, vec![PathBuf::from("/virtual/csrc/src/Vec4.h")]);
}
