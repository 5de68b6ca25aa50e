use std::fs;

use chat_widget_engine::{PersistError, StateFile};
use tempfile::TempDir;

#[test]
fn unwritten_file_reads_as_none() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path().join("missing"), "state.ron");
    assert_eq!(file.read().unwrap(), None);
    assert!(!file.remove().unwrap());
}

#[test]
fn replace_creates_nested_state_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("state").join("nested");
    let file = StateFile::new(&dir, "state.ron");

    file.replace("(a)").unwrap();
    assert!(dir.is_dir());
    assert_eq!(file.read().unwrap().as_deref(), Some("(a)"));
}

#[test]
fn replace_overwrites_and_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path(), "state.ron");

    file.replace("(a)").unwrap();
    file.replace("(b)").unwrap();

    assert_eq!(fs::read_to_string(file.path()).unwrap(), "(b)");
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn remove_clears_the_file() {
    let temp = TempDir::new().unwrap();
    let file = StateFile::new(temp.path(), "state.ron");
    file.replace("(a)").unwrap();

    assert!(file.remove().unwrap());
    assert_eq!(file.read().unwrap(), None);
}

#[test]
fn file_in_place_of_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let file = StateFile::new(&blocker, "state.ron");
    let err = file.replace("data").unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory(path) if path == blocker));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
