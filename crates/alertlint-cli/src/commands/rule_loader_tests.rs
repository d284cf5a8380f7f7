use std::fs;
use std::path::{Path, PathBuf};

use super::rule_loader::{LoadError, collect_dir, is_rule_file, load_rule_files};

#[test]
fn rule_file_extensions() {
    assert!(is_rule_file(Path::new("rules.yml")));
    assert!(is_rule_file(Path::new("dir/alerts.yaml")));
    assert!(!is_rule_file(Path::new("README.md")));
    assert!(!is_rule_file(Path::new("yml")));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = load_rule_files(&[PathBuf::from("does/not/exist.yml")]).unwrap_err();

    assert!(matches!(err, LoadError::Read { .. }));
    assert!(
        err.to_string()
            .starts_with("failed to read 'does/not/exist.yml': "),
        "{}",
        err
    );
}

#[test]
fn empty_path_list_loads_nothing() {
    assert!(load_rule_files(&[]).unwrap().is_empty());
}

#[test]
fn directory_walk_is_recursive_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("nested")).unwrap();
    fs::write(root.join("b.yml"), "- alert: B\n  expr: up\n").unwrap();
    fs::write(root.join("a.yaml"), "").unwrap();
    fs::write(root.join("notes.txt"), "skip").unwrap();
    fs::write(root.join("nested").join("c.yml"), "").unwrap();

    let found: Vec<PathBuf> = collect_dir(root)
        .unwrap()
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        found,
        [
            PathBuf::from("a.yaml"),
            PathBuf::from("b.yml"),
            Path::new("nested").join("c.yml"),
        ]
    );

    let files = load_rule_files(&[root.to_path_buf()]).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[1].source, "- alert: B\n  expr: up\n");
}

#[test]
fn directory_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("rules.yml");
    fs::write(&file, "").unwrap();

    let err = collect_dir(&file).unwrap_err();
    assert!(matches!(err, LoadError::Directory { .. }), "{}", err);
    assert!(err.to_string().starts_with("failed to read directory '"), "{}", err);
}

#[test]
fn directory_without_rule_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("README.md"), "").unwrap();

    let err = load_rule_files(&[dir.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, LoadError::Empty(_)), "{}", err);
}
