use std::fs::{create_dir_all, write};
use std::path::Path;

use repo_print_core::contract::{RepositorySource, SnapshotError};
use repo_print_core::source::DirectorySource;
use tempfile::tempdir;

fn build_tree(root: &Path) {
    for (path, content) in [
        ("README.md", "# demo\n"),
        ("LICENSE", "MIT\n"),
        ("lib/app.js", "app.disabled('etag');\n"),
        ("lib/router/index.js", "module.exports = {};\n"),
        ("src/main.rs", "fn main() {}\n"),
        (".env", "SECRET=1\n"),
        (".github/workflows/ci.yml", "on: push\n"),
        ("node_modules/dep/index.js", "dep\n"),
        ("target/debug/build.rs", "junk\n"),
    ] {
        let full = root.join(path);
        create_dir_all(full.parent().unwrap()).unwrap();
        write(full, content).unwrap();
    }
}

fn strings(p: &[&str]) -> Vec<String> {
    p.iter().map(|s| s.to_string()).collect()
}

#[test]
fn enumerates_relative_sorted_paths_with_default_pattern() {
    let tmp = tempdir().unwrap();
    build_tree(tmp.path());

    let source = DirectorySource::new(tmp.path());
    let candidates = source.enumerate(&strings(&["**/*.*"]), &[]).unwrap();

    assert_eq!(
        candidates,
        vec!["README.md", "lib/app.js", "lib/router/index.js", "src/main.rs"]
    );
}

#[test]
fn hidden_and_vendor_directories_are_pruned() {
    let tmp = tempdir().unwrap();
    build_tree(tmp.path());

    let source = DirectorySource::new(tmp.path());
    let candidates = source.enumerate(&[], &[]).unwrap();

    assert!(!candidates.iter().any(|p| p.starts_with('.')));
    assert!(!candidates.iter().any(|p| p.contains("node_modules")));
    assert!(!candidates.iter().any(|p| p.starts_with("target/")));
}

#[test]
fn include_and_exclude_patterns_are_applied() {
    let tmp = tempdir().unwrap();
    build_tree(tmp.path());

    let source = DirectorySource::new(tmp.path());
    let candidates = source
        .enumerate(&strings(&["**/lib/**.js"]), &strings(&["**/router/**"]))
        .unwrap();

    assert_eq!(candidates, vec!["lib/app.js"]);
}

#[test]
fn reads_candidates_relative_to_root() {
    let tmp = tempdir().unwrap();
    build_tree(tmp.path());

    let source = DirectorySource::new(tmp.path());
    assert_eq!(source.root(), tmp.path());
    assert_eq!(
        source.read_to_string("lib/app.js").unwrap(),
        "app.disabled('etag');\n"
    );
}

#[test]
fn non_utf8_content_is_a_read_error() {
    let tmp = tempdir().unwrap();
    write(tmp.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x81]).unwrap();

    let source = DirectorySource::new(tmp.path());
    let err = source.read_to_string("blob.bin").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn missing_root_is_an_enumeration_error() {
    let tmp = tempdir().unwrap();
    let source = DirectorySource::new(tmp.path().join("does-not-exist"));
    let err = source.enumerate(&[], &[]).unwrap_err();
    assert!(matches!(err, SnapshotError::Enumeration { .. }));
}
