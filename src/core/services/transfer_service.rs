//! JSON backup download/upload as offered to end users.

use std::{fs, path::Path};

use crate::core::ledger_store::LedgerStore;
use crate::ledger::Ledger;

use super::{ServiceError, ServiceResult};

/// Suggested file name for exported ledgers.
pub const EXPORT_FILE_NAME: &str = "students-fees.json";

pub struct TransferService;

impl TransferService {
    /// Exports the ledger, refusing when there is nothing to export.
    pub fn export(store: &LedgerStore) -> ServiceResult<String> {
        if store.students().is_empty() {
            return Err(ServiceError::Invalid("Nothing to export".into()));
        }
        Ok(store.export()?)
    }

    pub fn export_to_file(store: &LedgerStore, path: &Path) -> ServiceResult<()> {
        let json = Self::export(store)?;
        fs::write(path, json).map_err(crate::errors::LedgerError::from)?;
        Ok(())
    }

    /// Replaces the ledger with the file's contents; invalid files leave it untouched.
    pub fn import_from_file(store: &mut LedgerStore, path: &Path) -> ServiceResult<Ledger> {
        let text = fs::read_to_string(path).map_err(crate::errors::LedgerError::from)?;
        Ok(store.import_json(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NewStudent;
    use crate::storage::MemoryStore;
    use tempfile::tempdir;

    #[test]
    fn empty_ledger_is_not_exported() {
        let store = LedgerStore::new(Box::new(MemoryStore::new()));
        assert!(matches!(
            TransferService::export(&store),
            Err(ServiceError::Invalid(_))
        ));
    }

    #[test]
    fn file_roundtrip_between_stores() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        let mut source = LedgerStore::new(Box::new(MemoryStore::new()));
        source
            .add_student(NewStudent::new("Amina", "Grade 5").with_fee(100.0))
            .unwrap();
        TransferService::export_to_file(&source, &path).unwrap();

        let mut target = LedgerStore::new(Box::new(MemoryStore::new()));
        let imported = TransferService::import_from_file(&mut target, &path).unwrap();
        assert_eq!(imported, source.load());
        assert_eq!(target.students(), source.students());
    }
}
