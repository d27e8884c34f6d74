mod common;

use common::{setup_test_env, test_clock};
use fee_ledger::{
    config::{Config, ConfigManager},
    ledger::{NewPayment, NewStudent},
    storage::{BlobStore, JsonFileStore},
    LedgerStore, DEFAULT_STORAGE_KEY,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn atomic_write_failure_preserves_original_file() {
    let temp = tempdir().unwrap();
    let backend = JsonFileStore::new(temp.path().to_path_buf()).unwrap();
    let path = backend.blob_path(DEFAULT_STORAGE_KEY);
    let mut store = LedgerStore::new(Box::new(backend)).with_clock(test_clock());

    store
        .add_student(NewStudent::new("Amina", "Grade 5").with_fee(100.0))
        .expect("initial save");
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the staging name makes File::create fail.
    let mut tmp_path = path.clone();
    tmp_path.set_extension("json.tmp");
    fs::create_dir_all(&tmp_path).unwrap();

    let result = store.add_student(NewStudent::new("Cali", "Grade 6").with_fee(80.0));
    assert!(result.is_err(), "expected the write to fail when the staging path is a directory");

    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(current, original, "failed write must leave the previous ledger intact");
    assert_eq!(store.students().len(), 1);
}

#[test]
fn ledger_survives_reopening_the_store() {
    let (mut store, data_dir) = setup_test_env();
    let id = store
        .add_student(NewStudent::new("Amina", "Grade 5").with_fee(100.0))
        .unwrap()
        .id;
    store.record_payment(&id, NewPayment::new(25.0)).unwrap();

    let reopened = LedgerStore::new(Box::new(JsonFileStore::new(data_dir).unwrap()));
    let student = reopened.student(&id).expect("student reloaded");
    assert_eq!(student.amount_paid(), 25.0);
    assert_eq!(student.payments[0].date, "2024-09-01");
}

#[test]
fn previous_version_is_kept_as_backup() {
    let temp = tempdir().unwrap();
    let backend = JsonFileStore::new(temp.path().to_path_buf()).unwrap();
    let backup = backend.backup_path(DEFAULT_STORAGE_KEY);
    let path = backend.blob_path(DEFAULT_STORAGE_KEY);
    let mut store = LedgerStore::new(Box::new(backend));

    store.add_student(NewStudent::new("First", "A")).unwrap();
    let first = fs::read(&path).unwrap();
    assert!(!backup.exists(), "no backup before a file exists to replace");

    store.add_student(NewStudent::new("Second", "A")).unwrap();
    assert_eq!(fs::read(&backup).unwrap(), first);
}

#[test]
fn corrupted_file_loads_as_empty_ledger() {
    let (store, data_dir) = setup_test_env();
    let backend = JsonFileStore::new(data_dir).unwrap();
    fs::write(backend.blob_path(DEFAULT_STORAGE_KEY), "{\"students\": [").unwrap();

    assert!(store.load().is_empty());
    assert!(store.students().is_empty());
}

#[test]
fn external_edits_are_visible_on_next_query() {
    let (store, data_dir) = setup_test_env();
    assert!(store.students().is_empty());

    let backend = JsonFileStore::new(data_dir).unwrap();
    backend
        .set(
            DEFAULT_STORAGE_KEY,
            br#"{"students":[{"id":"s1","name":"Maryan","className":"Fasal 8","totalFee":50,"free":false,"payments":[]}]}"#,
        )
        .unwrap();

    let students = store.students();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "Maryan");
    assert_eq!(students[0].remaining(), 50.0);
}

#[test]
fn config_opens_store_under_its_data_dir() {
    let temp = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    let config = Config {
        storage_key: "school_2024".into(),
        data_dir: Some(temp.path().join("ledgers")),
        ..Config::default()
    };
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded, config);

    let mut store = loaded.open_store().unwrap();
    assert_eq!(store.key(), "school_2024");
    store.add_student(NewStudent::new("Amina", "Grade 5")).unwrap();
    assert!(temp.path().join("ledgers").join("school_2024.json").exists());
}
