// Output reconciler tests: stale files go, marked files stay, emptied
// directories collapse, and a second pass is a no-op.

use std::fs;
use std::path::Path;

use modelgen::reconcile::{DEFAULT_RETENTION, reconcile};

fn write(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("fixture dirs");
    }
    fs::write(path, body).expect("fixture file");
}

#[test]
fn deletes_unmarked_and_keeps_marked() {
    let root = tempfile::tempdir().expect("tempdir");
    let a = root.path().join("com/example/a.java");
    let b = root.path().join("com/example/b.java");
    write(&a, "// Generated by modelgen. Do not edit: regenerated on every run.\nclass a {}\n");
    write(&b, "// KEEP hand-maintained override\nclass b {}\n");

    let stats = reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(!a.exists());
    assert!(b.exists());
    assert_eq!(stats.deleted_files, 1);
    assert_eq!(stats.kept, 1);
    // b's contents untouched
    let body = fs::read_to_string(&b).expect("b readable");
    assert!(body.contains("hand-maintained"));
}

#[test]
fn marker_may_follow_blank_lines_but_not_content() {
    let root = tempfile::tempdir().expect("tempdir");
    let blank_then_marker = root.path().join("a.java");
    let late_marker = root.path().join("b.java");
    write(&blank_then_marker, "\n\n  // KEEP\nclass a {}\n");
    write(&late_marker, "class b {}\n// KEEP\n");

    reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(blank_then_marker.exists());
    assert!(!late_marker.exists());
}

#[test]
fn other_extensions_are_untouched() {
    let root = tempfile::tempdir().expect("tempdir");
    let note = root.path().join("README.md");
    write(&note, "notes\n");

    let stats = reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(note.exists());
    assert_eq!(stats.deleted_files, 0);
}

#[test]
fn emptied_directories_are_removed() {
    let root = tempfile::tempdir().expect("tempdir");
    let stale = root.path().join("com/example/deep/Old.java");
    write(&stale, "// stale\nclass Old {}\n");

    let stats = reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(!root.path().join("com").exists());
    assert_eq!(stats.deleted_files, 1);
    assert_eq!(stats.deleted_dirs, 3);
}

#[test]
fn directory_with_a_kept_file_survives() {
    let root = tempfile::tempdir().expect("tempdir");
    let kept = root.path().join("com/example/Kept.java");
    write(&kept, "// KEEP\nclass Kept {}\n");
    write(&root.path().join("com/example/Stale.java"), "// stale\n");

    reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(kept.exists());
    assert!(root.path().join("com/example").is_dir());
}

#[test]
fn dot_entries_are_skipped() {
    let root = tempfile::tempdir().expect("tempdir");
    let hidden = root.path().join(".cache/cached.java");
    write(&hidden, "// not a marker\n");

    reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("reconcile");
    assert!(hidden.exists());
}

#[test]
fn second_pass_changes_nothing() {
    let root = tempfile::tempdir().expect("tempdir");
    write(&root.path().join("a/Gone.java"), "// stale\n");
    write(&root.path().join("b/Kept.java"), "// KEEP\n");

    let first = reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("first pass");
    assert_eq!(first.deleted_files, 1);
    let second = reconcile(root.path(), "java", &DEFAULT_RETENTION).expect("second pass");
    assert_eq!(second.deleted_files, 0);
    assert_eq!(second.deleted_dirs, 0);
    assert_eq!(second.kept, 1);
}

#[test]
fn missing_root_is_a_no_op() {
    let root = tempfile::tempdir().expect("tempdir");
    let absent = root.path().join("never-created");
    let stats = reconcile(&absent, "java", &DEFAULT_RETENTION).expect("no-op");
    assert_eq!(stats.deleted_files, 0);
    assert_eq!(stats.kept, 0);
}
