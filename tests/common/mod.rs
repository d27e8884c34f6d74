#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use chrono::NaiveDate;
use fee_ledger::{
    core::{FixedClock, LedgerStore},
    storage::{JsonFileStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn test_clock() -> FixedClock {
    FixedClock::on(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
}

/// Creates an isolated file-backed store in a unique directory.
pub fn setup_test_env() -> (LedgerStore, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let data_dir = base.join("data");
    let backend = JsonFileStore::new(data_dir.clone()).expect("create json file store");
    let store = LedgerStore::new(Box::new(backend)).with_clock(test_clock());
    (store, data_dir)
}

/// Store over a shared in-memory backend so tests can inspect raw blobs.
pub fn memory_store() -> (LedgerStore, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(Box::new(backend.clone())).with_clock(test_clock());
    (store, backend)
}
