//! Integration Tests for the file-backed store
//!
//! Exercises the slot cache across process-like sessions: every test reopens
//! the store directory with a fresh cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slot_cache::cache::{RecordingWarningSink, SlotCache, SlotCategory};
use slot_cache::error::CacheError;
use slot_cache::{DurableStore, FileStore};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Student {
    id: String,
    full_name: String,
    class_id: String,
}

fn student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        full_name: format!("Student {id}"),
        class_id: "c1".to_string(),
    }
}

fn session(dir: &TempDir, capacity: usize) -> (SlotCache, Arc<FileStore>, Arc<RecordingWarningSink>) {
    let store = Arc::new(FileStore::open(dir.path(), capacity).unwrap());
    let sink = Arc::new(RecordingWarningSink::new());
    let cache = SlotCache::with_warning_sink(store.clone(), sink.clone());
    (cache, store, sink)
}

fn payload(units: usize) -> String {
    "x".repeat(units - 2)
}

#[test]
fn test_slots_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (cache, _, _) = session(&dir, 4096);
        let mut students = cache
            .open("students", SlotCategory::Primary, Vec::<Student>::new())
            .unwrap();
        students.set(vec![student("s1"), student("s2")]).unwrap();

        let mut grades = cache
            .open("grades-wassce", SlotCategory::Primary, BTreeMap::<String, u8>::new())
            .unwrap();
        grades
            .update(|current| {
                let mut next = current.clone();
                next.insert("A1".to_string(), 75);
                next
            })
            .unwrap();
    }

    let (cache, _, _) = session(&dir, 4096);
    let students = cache
        .open("students", SlotCategory::Primary, Vec::<Student>::new())
        .unwrap();
    let grades = cache
        .open("grades-wassce", SlotCategory::Primary, BTreeMap::<String, u8>::new())
        .unwrap();

    assert_eq!(students.get(), &vec![student("s1"), student("s2")]);
    assert_eq!(grades.get().get("A1"), Some(&75));
}

#[test]
fn test_default_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, store, _) = session(&dir, 4096);

    let quizzes = cache
        .open("quizzes-c1", SlotCategory::Primary, vec!["draft".to_string()])
        .unwrap();

    assert_eq!(quizzes.get(), &vec!["draft".to_string()]);
    assert!(!store.contains("quizzes-c1"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_eviction_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (cache, _, _) = session(&dir, 100);
        let mut notifications = cache
            .open("notifications", SlotCategory::Ephemeral, String::new())
            .unwrap();
        let mut students = cache.open("students", SlotCategory::Primary, String::new()).unwrap();
        notifications.set(payload(40)).unwrap();
        students.set(payload(50)).unwrap();

        let outcome = students.set(payload(90)).unwrap();
        assert_eq!(outcome.evicted, vec!["notifications".to_string()]);
    }

    let (cache, store, _) = session(&dir, 100);
    assert!(!store.contains("notifications"));
    assert_eq!(store.usage(), 90);

    let notifications = cache
        .open("notifications", SlotCategory::Ephemeral, String::from("none"))
        .unwrap();
    let students = cache.open("students", SlotCategory::Primary, String::new()).unwrap();
    assert_eq!(notifications.get(), "none");
    assert_eq!(students.get(), &payload(90));
}

#[test]
fn test_slots_from_earlier_session_are_evicted_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (cache, _, _) = session(&dir, 100);
        let mut notifications = cache
            .open("notifications", SlotCategory::Ephemeral, String::new())
            .unwrap();
        notifications.set(payload(60)).unwrap();
    }

    // The new session never opens "notifications"; its name marks it ephemeral
    let (cache, store, sink) = session(&dir, 100);
    let mut students = cache.open("students", SlotCategory::Primary, String::new()).unwrap();
    let outcome = students.set(payload(50)).unwrap();

    assert_eq!(outcome.evicted, vec!["notifications".to_string()]);
    assert!(!store.contains("notifications"));
    assert!(sink.is_empty());
    assert_eq!(store.usage(), 50);
}

#[test]
fn test_unopened_primary_files_are_never_evicted() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (cache, _, _) = session(&dir, 100);
        let mut classes = cache.open("classes", SlotCategory::Primary, String::new()).unwrap();
        classes.set(payload(60)).unwrap();
    }

    let (cache, store, sink) = session(&dir, 100);
    let mut students = cache.open("students", SlotCategory::Primary, String::new()).unwrap();
    let result = students.set(payload(50));

    assert!(matches!(result, Err(CacheError::StorageFull(_))));
    assert!(store.contains("classes"));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_key_length_bounded_by_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, store, _) = session(&dir, 4096);

    let longest = "k".repeat(FileStore::MAX_KEY_BYTES);
    cache
        .write_raw(&longest, SlotCategory::Primary, &serde_json::json!(1))
        .unwrap();
    assert!(store.contains(&longest));

    // Within the cache's general limit but too long for a file name
    let too_long = "k".repeat(256);
    let result = cache.write_raw(&too_long, SlotCategory::Primary, &serde_json::json!(1));
    assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    assert!(matches!(cache.read_raw(&too_long), Err(CacheError::InvalidKey(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_corrupt_file_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (cache, _, _) = session(&dir, 4096);
        let mut lessons = cache
            .open("lessons", SlotCategory::Primary, vec![1u32])
            .unwrap();
        lessons.set(vec![1, 2, 3]).unwrap();
    }
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        std::fs::write(entry.unwrap().path(), b"[1, 2, tru").unwrap();
    }

    let (cache, _, _) = session(&dir, 4096);
    let mut lessons = cache.open("lessons", SlotCategory::Primary, vec![0u32]).unwrap();
    assert_eq!(lessons.get(), &vec![0]);
    assert_eq!(cache.stats().decode_failures, 1);

    // The next write replaces the corrupt copy
    lessons.set(vec![4]).unwrap();
    assert_eq!(cache.read_raw("lessons").unwrap(), Some(serde_json::json!([4])));
}
