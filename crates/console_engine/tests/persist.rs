use std::fs;

use console_engine::{ensure_dir, write_atomically};
use tempfile::TempDir;

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("prefs");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_creates_parent_and_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("prefs.ron");

    write_atomically(&target, "hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

    write_atomically(&target, "world").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "world");
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = write_atomically(&file_path.join("prefs.ron"), "data");
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
